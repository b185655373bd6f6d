#[cfg(test)]
mod tests {
    use crate::configuration::Configuration;
    use crate::node::SqlNode;
    use crate::sql_source::build_bound_sql;
    use crate::structs::ParamObject;
    use crate::value::SqlValue;
    use crate::{impl_param_object, params};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    struct Author {
        username: String,
    }

    impl_param_object!(Author { username });

    #[derive(Debug, Clone)]
    struct Blog {
        id: i64,
        title: Option<String>,
        author: Author,
        tags: Vec<&'static str>,
    }

    impl_param_object!(Blog {
        id,
        title as "blogTitle",
        author,
        tags,
    });

    #[test]
    fn params_builds_maps() {
        assert_eq!(params! {}, SqlValue::Map(Default::default()));
        let p = params! { "id" => 1, "name" => String::from("x"), };
        assert_eq!(p.property("id"), Some(&SqlValue::from(1)));
        assert_eq!(p.property("name"), Some(&SqlValue::from("x")));
    }

    #[test]
    fn param_object_fields_and_nesting() {
        assert_eq!(Blog::FIELDS, &["id", "blogTitle", "author", "tags"]);

        let blog = Blog {
            id: 7,
            title: None,
            author: Author {
                username: "jim".to_string(),
            },
            tags: vec!["rust", "sql"],
        };
        let param = SqlValue::from(&blog);
        assert_eq!(param.property("blogTitle"), Some(&SqlValue::Null));
        assert_eq!(
            param.property("author").and_then(|a| a.property("username")),
            Some(&SqlValue::from("jim"))
        );
        assert_eq!(param, blog.to_param());
    }

    #[test]
    fn param_object_drives_a_template() {
        let blog = Blog {
            id: 7,
            title: Some("Rust".to_string()),
            author: Author {
                username: "jim".to_string(),
            },
            tags: vec!["a"],
        };
        let param = SqlValue::from(blog);
        let root = SqlNode::mixed([
            SqlNode::text("SELECT * FROM BLOG WHERE id = #{id}"),
            SqlNode::if_("author.username == 'jim'", SqlNode::text("AND author = #{author.username}")),
            SqlNode::if_("tags.contains('a')", SqlNode::text("AND title = #{blogTitle}")),
        ]);
        let bound = build_bound_sql(&root, &param, &Configuration::new()).unwrap();
        assert_eq!(
            bound.sql(),
            "SELECT * FROM BLOG WHERE id = ? AND author = ? AND title = ?"
        );
        assert_eq!(
            bound.parameter_values(),
            vec![SqlValue::from(7), SqlValue::from("jim"), SqlValue::from("Rust")]
        );
    }
}
