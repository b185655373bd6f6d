#[cfg(test)]
mod tests {
    use crate::configuration::Configuration;
    use crate::error::{BuildError, NodeKind};
    use crate::evaluator::EvalError;
    use crate::node::SqlNode;
    use crate::params;
    use crate::sql_source::build_bound_sql;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    fn sql(root: &SqlNode, param: &SqlValue) -> String {
        build_bound_sql(root, param, &Configuration::new())
            .unwrap()
            .sql()
            .to_string()
    }

    fn categories(first: &str, second: &str) -> SqlNode {
        SqlNode::mixed([
            SqlNode::text("SELECT * FROM BLOG"),
            SqlNode::choose(
                [
                    (first, SqlNode::text("WHERE CATEGORY = ?")),
                    (second, SqlNode::text("WHERE CATEGORY = 'NONE'")),
                ],
                Some(SqlNode::text("WHERE CATEGORY = 'DEFAULT'")),
            ),
        ])
    }

    #[test]
    fn mixed_and_if() {
        let root = SqlNode::mixed([
            SqlNode::text("SELECT * FROM BLOG"),
            SqlNode::if_("true", SqlNode::text("WHERE ID = ?")),
        ]);
        assert_eq!(sql(&root, &SqlValue::Null), "SELECT * FROM BLOG WHERE ID = ?");

        let root = SqlNode::mixed([
            SqlNode::text("SELECT * FROM BLOG"),
            SqlNode::if_("false", SqlNode::text("WHERE ID = ?")),
        ]);
        assert_eq!(sql(&root, &SqlValue::Null), "SELECT * FROM BLOG");
    }

    #[test]
    fn choose_runs_at_most_one_branch() {
        assert_eq!(
            sql(&categories("false", "false"), &SqlValue::Null),
            "SELECT * FROM BLOG WHERE CATEGORY = 'DEFAULT'"
        );
        assert_eq!(
            sql(&categories("true", "true"), &SqlValue::Null),
            "SELECT * FROM BLOG WHERE CATEGORY = ?"
        );
        assert_eq!(
            sql(&categories("false", "true"), &SqlValue::Null),
            "SELECT * FROM BLOG WHERE CATEGORY = 'NONE'"
        );

        let no_default = SqlNode::choose([("false", SqlNode::text("x"))], None);
        assert_eq!(sql(&no_default, &SqlValue::Null), "");
    }

    #[test]
    fn if_tests_against_parameter() {
        let root = SqlNode::mixed([
            SqlNode::text("SELECT * FROM BLOG WHERE 1 = 1"),
            SqlNode::if_("title != null", SqlNode::text("AND TITLE like #{title}")),
            SqlNode::if_("author != null and author.name != null", SqlNode::text("AND AUTHOR = #{author.name}")),
        ]);
        let param = params! { "title" => "%rust%" };
        assert_eq!(
            sql(&root, &param),
            "SELECT * FROM BLOG WHERE 1 = 1 AND TITLE like ?"
        );
    }

    #[test]
    fn interpolation_of_null_is_empty() {
        let root = SqlNode::text("id=${id}");
        assert_eq!(sql(&root, &params! { "id" => SqlValue::Null }), "id=");
        assert_eq!(sql(&root, &SqlValue::Null), "id=");
    }

    #[test]
    fn interpolation_of_scalar_parameter() {
        let root = SqlNode::text("SELECT * FROM ${value}");
        assert_eq!(sql(&root, &SqlValue::from("BLOG")), "SELECT * FROM BLOG");
    }

    #[test]
    fn expression_interpolation() {
        let root = SqlNode::text(r"Expression test: ${name.indexOf('v')} / ${name in {'Bob', 'Steve'\} ? 'yes' : 'no'}.");
        assert_eq!(
            sql(&root, &params! { "name" => "Steve" }),
            "Expression test: 3 / yes."
        );
    }

    #[test]
    fn bind_is_visible_to_later_nodes_and_exported() {
        let root = SqlNode::mixed([
            SqlNode::bind("pattern", "'%' + title + '%'"),
            SqlNode::text("SELECT * FROM BLOG WHERE title LIKE #{pattern}"),
        ]);
        let param = params! { "title" => "rust" };
        let bound = build_bound_sql(&root, &param, &Configuration::new()).unwrap();
        assert_eq!(bound.sql(), "SELECT * FROM BLOG WHERE title LIKE ?");
        assert_eq!(bound.additional_parameter("pattern"), Some(&SqlValue::from("%rust%")));
        assert_eq!(bound.resolve_parameter("pattern"), Some(&SqlValue::from("%rust%")));
    }

    #[test]
    fn expression_errors_name_the_node() {
        let root = SqlNode::if_("age >", SqlNode::text("x"));
        let err = build_bound_sql(&root, &SqlValue::Null, &Configuration::new()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Expression {
                node: NodeKind::If,
                ref expression,
                source: EvalError::Parse { .. },
            } if expression == "age >"
        ));

        let root = SqlNode::text("${1 / 0}");
        let err = build_bound_sql(&root, &SqlValue::Null, &Configuration::new()).unwrap_err();
        assert_eq!(
            err,
            BuildError::Expression {
                node: NodeKind::Text,
                expression: "1 / 0".to_string(),
                source: EvalError::DivisionByZero,
            }
        );
    }

    #[test]
    fn injection_filter_rejects_values() {
        let config = Configuration::new().with_injection_filter(|v| !v.contains(';'));
        let root = SqlNode::text("ORDER BY ${column}");

        let param = params! { "column" => "name" };
        let ok = build_bound_sql(&root, &param, &config).unwrap();
        assert_eq!(ok.sql(), "ORDER BY name");

        let err = build_bound_sql(&root, &params! { "column" => "1; DROP TABLE BLOG" }, &config).unwrap_err();
        assert_eq!(
            err,
            BuildError::InjectionRejected {
                expression: "column".to_string(),
                value: "1; DROP TABLE BLOG".to_string(),
            }
        );
    }

    #[test]
    fn static_and_dynamic_detection() {
        let config = Configuration::new();
        assert!(!SqlNode::text("SELECT * FROM BLOG WHERE ID = #{id}").is_dynamic(&config));
        assert!(SqlNode::text("SELECT * FROM ${table}").is_dynamic(&config));
        assert!(SqlNode::mixed([SqlNode::text("a"), SqlNode::if_("true", SqlNode::text("b"))]).is_dynamic(&config));
        assert!(!SqlNode::mixed([SqlNode::text("a"), SqlNode::text("b")]).is_dynamic(&config));
    }
}
