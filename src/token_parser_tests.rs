#[cfg(test)]
mod tests {
    use crate::token_parser::{TokenHandler, TokenParser};
    use pretty_assertions::assert_eq;

    fn upper(text: &str) -> String {
        TokenParser::new("${", "}").replace(text, |content| content.to_uppercase())
    }

    #[test]
    fn replaces_every_token() {
        assert_eq!(upper("a ${x} b ${yy}"), "a X b YY");
        assert_eq!(upper("${x}${y}"), "XY");
        assert_eq!(upper("no tokens here"), "no tokens here");
        assert_eq!(upper(""), "");
    }

    #[test]
    fn escaped_open_token_stays_literal() {
        assert_eq!(upper(r"cost \${x} and ${y}"), "cost ${x} and Y");
    }

    #[test]
    fn escaped_close_token_is_part_of_content() {
        let out = TokenParser::new("${", "}").replace(r"${a\}b}", |content| format!("[{content}]"));
        assert_eq!(out, "[a}b]");
    }

    #[test]
    fn unclosed_token_is_kept_by_lenient_handler() {
        assert_eq!(upper("a ${x} b ${unclosed"), "a X b ${unclosed");
    }

    #[test]
    fn empty_token_content_is_passed_through() {
        let out = TokenParser::new("#{", "}").replace("x = #{}", |content| format!("<{content}>"));
        assert_eq!(out, "x = <>");
    }

    struct Strict(Vec<String>);

    impl TokenHandler for Strict {
        type Error = String;

        fn handle_token(&mut self, content: &str) -> Result<String, String> {
            self.0.push(content.to_string());
            Ok("?".to_string())
        }

        fn handle_unclosed(&mut self, rest: &str) -> Result<String, String> {
            Err(format!("unclosed at `{rest}`"))
        }
    }

    #[test]
    fn strict_handler_collects_in_order_and_rejects_unclosed() {
        let parser = TokenParser::new("#{", "}");
        let mut h = Strict(Vec::new());
        assert_eq!(parser.parse("a = #{a} AND b = #{b.c}", &mut h), Ok("a = ? AND b = ?".to_string()));
        assert_eq!(h.0, vec!["a".to_string(), "b.c".to_string()]);

        let mut h = Strict(Vec::new());
        assert_eq!(
            parser.parse("a = #{a", &mut h),
            Err("unclosed at `#{a`".to_string())
        );
    }

    #[test]
    fn custom_delimiters() {
        let parser = TokenParser::new("@@", "@@");
        assert!(parser.has_token("x @@y@@"));
        assert_eq!(parser.replace("x @@y@@ z", |c| c.repeat(2)), "x yy z");
    }
}
