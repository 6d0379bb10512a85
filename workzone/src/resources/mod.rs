pub mod automerge;
pub mod policy;
pub mod reviewer_set;
pub mod reviewers;
pub mod workflow;

pub use automerge::AutomergePolicy;
pub use policy::PolicyResource;
pub use reviewer_set::ReviewerNames;
pub use reviewers::{FilePathReviewersBlock, ReviewersPolicy};
pub use workflow::WorkflowPolicy;

pub type AutomergeResource = PolicyResource<AutomergePolicy>;
pub type ReviewersResource = PolicyResource<ReviewersPolicy>;
pub type WorkflowResource = PolicyResource<WorkflowPolicy>;
