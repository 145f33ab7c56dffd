//! Clinical trial search and retrieval (ClinicalTrials.gov v2).

pub mod getter;
pub mod search;

pub use getter::{TrialModule, fetch_trial, get_trial, study_url};
pub use search::{
    AgeGroup, DateField, InterventionType, PrimaryPurpose, RecruitingStatus, SortOrder,
    SponsorType, StudyDesign, StudyType, TrialPhase, TrialQuery, convert_query, search_trials,
};
