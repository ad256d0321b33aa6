//! Well-known identifiers from the cmi5 and xAPI specifications.

/// State document holding the session's launch data.
pub const STATE_LMS_LAUNCH_DATA: &str = "LMS.LaunchData";

/// Agent profile document holding the learner's preferences.
pub const AGENT_PROFILE_LEARNER_PREFERENCES: &str = "CMI5LearnerPreferences";

/// Category activity marking a statement as a cmi5 "defined" statement.
pub const CATEGORY_ACTIVITY_CMI5: &str = "http://purl.org/xapi/cmi5/context/categories/cmi5";

/// Category activity marking a statement as satisfying moveOn criteria.
pub const CATEGORY_ACTIVITY_MOVEON: &str = "http://purl.org/xapi/cmi5/context/categories/moveon";

/// Context extension carrying the LMS-assigned session ID.
pub const EXTENSION_SESSION_ID: &str = "http://purl.org/xapi/cmi5/context/extensions/sessionid";

pub const VERB_INITIALIZED: &str = "http://adlnet.gov/expapi/verbs/initialized";
pub const VERB_TERMINATED: &str = "http://adlnet.gov/expapi/verbs/terminated";
pub const VERB_COMPLETED: &str = "http://adlnet.gov/expapi/verbs/completed";
pub const VERB_PASSED: &str = "http://adlnet.gov/expapi/verbs/passed";
pub const VERB_FAILED: &str = "http://adlnet.gov/expapi/verbs/failed";
pub const VERB_ANSWERED: &str = "http://adlnet.gov/expapi/verbs/answered";

/// Query parameters every launch invocation must supply, non-empty.
pub const LAUNCH_PARAMETERS: [&str; 5] =
    ["endpoint", "fetch", "actor", "activityId", "registration"];
