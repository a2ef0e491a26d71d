pub(crate) mod intake;
pub(crate) mod llm;
pub(crate) mod reasoning;
pub(crate) mod retrieval;
