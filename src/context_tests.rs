#[cfg(test)]
mod tests {
    use crate::configuration::Configuration;
    use crate::context::{DATABASE_ID_KEY, DynamicContext, PARAMETER_OBJECT_KEY, itemize};
    use crate::evaluator::Scope;
    use crate::params;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_bindings_are_always_present() {
        let config = Configuration::new().with_database_id("mysql");
        let param = params! { "id" => 7 };
        let ctx = DynamicContext::new(&config, &param);
        assert_eq!(ctx.lookup(PARAMETER_OBJECT_KEY), Some(&param));
        assert_eq!(ctx.lookup(DATABASE_ID_KEY), Some(&SqlValue::from("mysql")));
        assert_eq!(ctx.lookup("id"), Some(&SqlValue::from(7)));
        assert_eq!(ctx.lookup("missing"), None);
    }

    #[test]
    fn inner_scope_shadows_and_pop_restores() {
        let config = Configuration::new();
        let param = params! { "item" => "outer" };
        let mut ctx = DynamicContext::new(&config, &param);

        ctx.push_scope();
        ctx.bind("item", SqlValue::from("inner"));
        assert_eq!(ctx.lookup("item"), Some(&SqlValue::from("inner")));
        assert_eq!(ctx.depth(), 2);

        ctx.pop_scope();
        assert_eq!(ctx.lookup("item"), Some(&SqlValue::from("outer")));

        // 全局作用域不会被弹出
        ctx.pop_scope();
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn scalar_and_list_parameters() {
        let config = Configuration::new();

        let scalar = SqlValue::from("abc");
        let ctx = DynamicContext::new(&config, &scalar);
        assert_eq!(ctx.lookup("value"), Some(&scalar));
        assert_eq!(ctx.lookup("anything"), Some(&scalar));

        let list = SqlValue::list([1, 2]);
        let ctx = DynamicContext::new(&config, &list);
        assert_eq!(ctx.lookup("list"), Some(&list));
        assert_eq!(ctx.lookup("collection"), Some(&list));
        assert_eq!(ctx.lookup("array"), Some(&list));
        assert_eq!(ctx.lookup("other"), None);

        let null = SqlValue::Null;
        let ctx = DynamicContext::new(&config, &null);
        assert_eq!(ctx.lookup("id"), None);
    }

    #[test]
    fn unique_numbers_and_global_bindings() {
        let config = Configuration::new();
        let param = SqlValue::Null;
        let mut ctx = DynamicContext::new(&config, &param);
        assert_eq!(ctx.next_unique_number(), 0);
        assert_eq!(ctx.next_unique_number(), 1);

        ctx.push_scope();
        ctx.bind_global(itemize("item", 1), SqlValue::from("x"));
        ctx.pop_scope();

        let bindings = ctx.into_bindings();
        assert_eq!(bindings.get("__frch_item_1"), Some(&SqlValue::from("x")));
        assert_eq!(bindings.get(DATABASE_ID_KEY), Some(&SqlValue::Null));
        assert!(bindings.contains_key(PARAMETER_OBJECT_KEY));
    }
}
