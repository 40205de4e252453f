//! User-facing transcript and indicator text.

pub const GENERIC_FAILURE: &str = "An error occurred.";
pub const COMMUNICATION_FAILURE: &str = "A communication error occurred.";
pub const JOB_URLS_MISSING: &str = "Progress URLs are not configured.";
pub const RESULT_MISSING: &str = "Failed to retrieve the result.";
pub const JOB_ALREADY_ACTIVE: &str = "A recommendation is already being prepared.";
pub const POLL_BUDGET_EXHAUSTED: &str =
    "The recommendation is taking too long. Please try again later.";
pub const REMOTE_ERROR_PREFIX: &str = "An error occurred: ";

pub const SENDING_TITLE: &str = "Sending…";
pub const SENDING_DETAIL: &str = "Waiting for a reply";
pub const JOB_TITLE: &str = "Building your recommendations…";
pub const JOB_DETAIL: &str = "Searching data and generating an answer";
pub const JOB_PREPARING: &str = "Preparing...";
