//! CustomRun extra fields codec
//!
//! A CustomRun standing in for a single Build records the BuildRun it caused
//! as structured extra fields instead of a label.

use triggers_core::domain::custom_run::CustomRunStatus;
use triggers_core::dto::extra_fields::ExtraFields;

use crate::error::{FilterError, Result};

/// Stores the BuildRun identity in the CustomRun status
pub fn encode_extra_fields(status: &mut CustomRunStatus, extra_fields: &ExtraFields) -> Result<()> {
    let value = serde_json::to_value(extra_fields).map_err(FilterError::ExtraFieldsMalformed)?;
    status.extra_fields = Some(value);
    Ok(())
}

/// Reads the BuildRun identity back from the CustomRun status
///
/// An absent or empty payload is `ExtraFieldsNotPopulated`; a payload that
/// does not decode, or decodes to a blank identity, is corrupt.
pub fn decode_extra_fields(status: &CustomRunStatus) -> Result<ExtraFields> {
    let value = match &status.extra_fields {
        Some(value) if status.extra_fields_size() > 0 => value,
        _ => return Err(FilterError::ExtraFieldsNotPopulated),
    };

    let extra_fields: ExtraFields =
        serde_json::from_value(value.clone()).map_err(FilterError::ExtraFieldsMalformed)?;
    if extra_fields.is_empty() {
        return Err(FilterError::ExtraFieldsEmpty);
    }

    Ok(extra_fields)
}
