pub(crate) mod grading_results;
pub(crate) mod grading_store;
pub(crate) mod health;
pub(crate) mod problem_submissions;
pub(crate) mod reference_problems;
pub(crate) mod submissions;
