use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::ReferenceProblem;

const fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ProblemListQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub(crate) limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must be non-negative"))]
    pub(crate) offset: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DomainQuery {
    #[validate(length(min = 1, max = 256, message = "domain must not be empty"))]
    pub(crate) domain: String,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub(crate) limit: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DifficultyQuery {
    #[validate(range(min = 0.0, max = 10.0, message = "level must be between 0 and 10"))]
    pub(crate) level: f64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProblemResponse {
    pub(crate) problem_id: i64,
    pub(crate) problem: String,
    pub(crate) domain: Vec<String>,
    pub(crate) answer: String,
    pub(crate) solution: String,
    pub(crate) difficulty: Option<f64>,
}

impl From<ReferenceProblem> for ProblemResponse {
    fn from(problem: ReferenceProblem) -> Self {
        Self {
            problem_id: problem.problem_id,
            problem: problem.problem,
            domain: problem.domain,
            answer: problem.answer,
            solution: problem.solution,
            difficulty: problem.difficulty,
        }
    }
}

/// Comma-separated domain filter into distinct, trimmed names (first spelling wins).
pub(crate) fn parse_domains(raw: &str) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for domain in raw.split(',').map(str::trim).filter(|domain| !domain.is_empty()) {
        if !domains.iter().any(|seen| seen.eq_ignore_ascii_case(domain)) {
            domains.push(domain.to_string());
        }
    }
    domains
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_domains_trims_and_dedupes() {
        assert_eq!(
            parse_domains(" Algebra, geometry ,,algebra"),
            vec!["Algebra".to_string(), "geometry".to_string()]
        );
        assert!(parse_domains(" , ").is_empty());
        assert!(parse_domains("").is_empty());
    }

    #[test]
    fn list_query_bounds_are_validated() {
        assert!(ProblemListQuery { limit: 10, offset: 0 }.validate().is_ok());
        assert!(ProblemListQuery { limit: 0, offset: 0 }.validate().is_err());
        assert!(ProblemListQuery { limit: 10, offset: -1 }.validate().is_err());
        assert!(DifficultyQuery { level: 11.0, limit: 10 }.validate().is_err());
    }
}
