// ATSClients
//
// One module per provider family (§4.4), each implementing the shared
// `AtsClient` port and sharing one injected `reqwest::Client`. 404 is a
// normal empty result; other non-2xx statuses and connection failures
// propagate as `AppError::Transient`/`AppError::Http`.

mod ashby;
mod breezyhr;
mod greenhouse;
mod jobvite;
mod lever;
mod personio;
mod recruitee;
mod smartrecruiters;
mod workable;

pub use ashby::AshbyClient;
pub use breezyhr::BreezyHrClient;
pub use greenhouse::GreenhouseClient;
pub use jobvite::JobviteClient;
pub use lever::LeverClient;
pub use personio::PersonioClient;
pub use recruitee::RecruiteeClient;
pub use smartrecruiters::SmartRecruitersClient;
pub use workable::WorkableClient;

use leadsignal_core::error::AppError;

pub(crate) fn map_reqwest_error(context: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() || err.is_connect() {
        AppError::Transient(format!("{context}: {err}"))
    } else {
        AppError::Http(format!("{context}: {err}"))
    }
}

/// Render a JSON `id` field (string or number) as a plain string, without
/// the surrounding quotes `Value::to_string()` would add to a JSON string.
pub(crate) fn value_to_id_string(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
        None => String::new(),
    }
}
