#[cfg(test)]
mod tests {
    use crate::configuration::Configuration;
    use crate::error::BuildError;
    use crate::flavor::Flavor;
    use crate::mapping::{JdbcType, ParameterMapping, ParameterMode};
    use crate::placeholder::{ParameterExpression, extract};
    use crate::type_handler::TypeHandlerId;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_property_jdbc_type_and_options() {
        let e = ParameterExpression::parse(" user.id :NUMERIC, numericScale=2 , mode=OUT").unwrap();
        assert_eq!(e.property, "user.id");
        assert_eq!(e.jdbc_type.as_deref(), Some("NUMERIC"));
        assert_eq!(
            e.attributes,
            vec![
                ("numericScale".to_string(), "2".to_string()),
                ("mode".to_string(), "OUT".to_string()),
            ]
        );
    }

    #[test]
    fn parse_rejects_malformed_content() {
        assert!(ParameterExpression::parse("(id + 1)").is_err());
        assert!(ParameterExpression::parse("  ").is_err());
        assert!(ParameterExpression::parse(":VARCHAR").is_err());
        assert!(ParameterExpression::parse("id:").is_err());
        assert!(ParameterExpression::parse("id, jdbcType").is_err());
    }

    #[test]
    fn extract_replaces_in_order() {
        let config = Configuration::new();
        let (sql, mappings) = extract(
            "UPDATE t SET a = #{a}, b = #{b,jdbcType=VARCHAR,javaType=string} WHERE id = #{id:BIGINT}",
            &config,
        )
        .unwrap();
        assert_eq!(sql, "UPDATE t SET a = ?, b = ? WHERE id = ?");

        let mut b = ParameterMapping::new("b", 1);
        b.jdbc_type = Some(JdbcType::VarChar);
        b.java_type = Some("string".to_string());
        let mut id = ParameterMapping::new("id", 2);
        id.jdbc_type = Some(JdbcType::BigInt);
        assert_eq!(mappings, vec![ParameterMapping::new("a", 0), b, id]);
    }

    #[test]
    fn extract_with_positional_flavors() {
        let text = "a = #{a} AND b = #{b} AND c = #{c}";
        let pg = Configuration::new().with_flavor(Flavor::PostgreSQL);
        assert_eq!(extract(text, &pg).unwrap().0, "a = $1 AND b = $2 AND c = $3");
        let ms = Configuration::new().with_flavor(Flavor::SQLServer);
        assert_eq!(extract(text, &ms).unwrap().0, "a = @p1 AND b = @p2 AND c = @p3");
        let ora = Configuration::new().with_flavor(Flavor::Oracle);
        assert_eq!(extract(text, &ora).unwrap().0, "a = :1 AND b = :2 AND c = :3");
    }

    #[test]
    fn all_attributes_map_onto_the_mapping() {
        let config = Configuration::new();
        let (_, mappings) = extract(
            "#{price, mode=INOUT, numericScale=4, resultMap=priceMap, typeHandler=DecimalTypeHandler, jdbcTypeName=MONEY, property=ignored}",
            &config,
        )
        .unwrap();
        let m = &mappings[0];
        assert_eq!(m.property, "price");
        assert_eq!(m.mode, ParameterMode::InOut);
        assert_eq!(m.numeric_scale, Some(4));
        assert_eq!(m.result_map_id.as_deref(), Some("priceMap"));
        assert_eq!(m.type_handler, Some(TypeHandlerId::new("DecimalTypeHandler")));
        assert_eq!(m.jdbc_type_name.as_deref(), Some("MONEY"));
    }

    #[test]
    fn extract_errors() {
        let config = Configuration::new();
        assert!(matches!(
            extract("a = #{a, color=red}", &config),
            Err(BuildError::MalformedPlaceholder { .. })
        ));
        assert!(matches!(
            extract("a = #{(a + 1)}", &config),
            Err(BuildError::MalformedPlaceholder { .. })
        ));
        assert!(matches!(
            extract("a = #{a:varchar}", &config),
            Err(BuildError::MalformedPlaceholder { .. })
        ));
        assert!(matches!(
            extract("a = #{a, numericScale=-1}", &config),
            Err(BuildError::MalformedPlaceholder { .. })
        ));
        assert_eq!(
            extract("a = #{a", &config),
            Err(BuildError::MalformedPlaceholder {
                content: "#{a".to_string(),
                reason: "unclosed placeholder".to_string(),
            })
        );
        assert_eq!(
            extract("a = #{a,typeHandler=MoneyTypeHandler}", &config),
            Err(BuildError::UnresolvedTypeHandler {
                content: "a,typeHandler=MoneyTypeHandler".to_string(),
                handler: "MoneyTypeHandler".to_string(),
            })
        );
    }

    #[test]
    fn custom_type_handler_and_escaped_placeholder() {
        let mut config = Configuration::new();
        config
            .type_handlers_mut()
            .register("money", TypeHandlerId::new("acme.MoneyTypeHandler"));
        let (sql, mappings) = extract(r"a = #{a,typeHandler=money} AND b = '\#{b}'", &config).unwrap();
        assert_eq!(sql, "a = ? AND b = '#{b}'");
        assert_eq!(
            mappings[0].type_handler,
            Some(TypeHandlerId::new("acme.MoneyTypeHandler"))
        );
        assert_eq!(mappings.len(), 1);
    }
}
