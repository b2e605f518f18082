//! Paper submission workflow and the organizer-facing operations built on
//! top of the [`Store`](crate::store::Store) boundary.

pub mod authors;
pub mod conferences;
pub mod file_stager;
pub mod paper_id;
pub mod review;
pub mod submission;

pub use authors::{AuthorResolver, ResolvedAuthors};
pub use file_stager::{FileStager, PaperFile};
pub use paper_id::generate_paper_id;
pub use submission::{PaperEdit, PaperWorkflow, Submission};
