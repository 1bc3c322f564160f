//! Parsing of `--filter` arguments.

use shared::models::{Filter, FilterOperator};

/// Operators in match order: longer tokens first so `!=` is not read as `=`.
const OPERATORS: [(&str, FilterOperator); 6] = [
    ("!*=", FilterOperator::NotContains),
    ("*=", FilterOperator::Contains),
    ("=~", FilterOperator::Regex),
    ("!~", FilterOperator::NotRegex),
    ("!=", FilterOperator::NotEquals),
    ("=", FilterOperator::Equals),
];

/// Parses `label<op>value`, splitting at the first operator found.
pub fn parse_filter(arg: &str) -> Result<Filter, String> {
    let (index, token, operator) = OPERATORS
        .iter()
        .filter_map(|(token, op)| arg.find(token).map(|i| (i, *token, *op)))
        .min_by_key(|(i, token, _)| (*i, std::cmp::Reverse(token.len())))
        .ok_or_else(|| format!("'{arg}' has no operator (=, !=, =~, !~, *=, !*=)"))?;

    let label = arg[..index].trim();
    if label.is_empty() {
        return Err(format!("'{arg}' has no label"));
    }
    Ok(Filter::new(label, operator, &arg[index + token.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let cases = [
            ("status=500", FilterOperator::Equals, "500"),
            ("status!=500", FilterOperator::NotEquals, "500"),
            ("route=~/api/.*", FilterOperator::Regex, "/api/.*"),
            ("route!~/health", FilterOperator::NotRegex, "/health"),
            ("route*=api", FilterOperator::Contains, "api"),
            ("route!*=api", FilterOperator::NotContains, "api"),
        ];
        for (arg, operator, value) in cases {
            let filter = parse_filter(arg).unwrap();
            assert_eq!(filter.label, arg.split(['=', '!', '*']).next().unwrap());
            assert_eq!(filter.operator, operator, "{arg}");
            assert_eq!(filter.value, value, "{arg}");
        }
    }

    #[test]
    fn test_value_may_contain_operators() {
        let filter = parse_filter("query=a=b").unwrap();
        assert_eq!(filter.operator, FilterOperator::Equals);
        assert_eq!(filter.value, "a=b");
    }

    #[test]
    fn test_empty_value_allowed() {
        assert_eq!(parse_filter("env=").unwrap().value, "");
    }

    #[test]
    fn test_rejects_missing_parts() {
        assert!(parse_filter("status").is_err());
        assert!(parse_filter("=500").is_err());
    }
}
