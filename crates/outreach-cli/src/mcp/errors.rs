//! Error handling utilities for MCP server

use outreach_core::OutreachError;
use rmcp::ErrorData;

/// Convert an engine error into an MCP error: caller mistakes become
/// `invalid_params`, everything else `internal_error`.
pub fn to_mcp_error(message: &str, error: &OutreachError) -> ErrorData {
    let text = format!("{message}: {error}");
    if error.is_client_error() {
        ErrorData::invalid_params(text, None)
    } else {
        ErrorData::internal_error(text, None)
    }
}

pub fn not_found(kind: &str, id: u64) -> ErrorData {
    ErrorData::invalid_params(format!("{kind} with ID {id} not found"), None)
}
