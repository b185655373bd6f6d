//! 通用 token 扫描：在文本中定位 `open ... close` 片段并交给处理器替换。
//!
//! - `\` 紧跟在 open token 前：该 token 被转义，去掉反斜杠后原样输出。
//! - token 内部 `\` 紧跟在 close token 前：close 被视为内容的一部分。
//! - 缺少 close 的 open token 交给 `TokenHandler::handle_unclosed` 处理。

use std::convert::Infallible;

/// token 处理器。
pub(crate) trait TokenHandler {
    type Error;

    /// 处理一个完整 token 的内容（不含 open/close），返回替换文本。
    fn handle_token(&mut self, content: &str) -> Result<String, Self::Error>;

    /// 处理从未闭合 open token 开始的剩余文本，默认原样保留。
    fn handle_unclosed(&mut self, rest: &str) -> Result<String, Self::Error> {
        Ok(rest.to_string())
    }
}

/// 用闭包实现的宽松处理器：未闭合的 token 原样保留。
pub(crate) struct FnHandler<F>(pub(crate) F);

impl<F> TokenHandler for FnHandler<F>
where
    F: FnMut(&str) -> String,
{
    type Error = Infallible;

    fn handle_token(&mut self, content: &str) -> Result<String, Infallible> {
        Ok((self.0)(content))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TokenParser<'a> {
    open: &'a str,
    close: &'a str,
}

impl<'a> TokenParser<'a> {
    pub(crate) fn new(open: &'a str, close: &'a str) -> Self {
        Self { open, close }
    }

    /// 文本中是否出现 open token。
    pub(crate) fn has_token(&self, text: &str) -> bool {
        !self.open.is_empty() && text.contains(self.open)
    }

    pub(crate) fn parse<H: TokenHandler>(&self, text: &str, handler: &mut H) -> Result<String, H::Error> {
        if text.is_empty() || self.open.is_empty() || self.close.is_empty() {
            return Ok(text.to_string());
        }
        let Some(mut start) = text.find(self.open) else {
            return Ok(text.to_string());
        };

        let mut out = String::with_capacity(text.len());
        let mut offset = 0usize;
        loop {
            if start > 0 && text.as_bytes()[start - 1] == b'\\' {
                out.push_str(&text[offset..start - 1]);
                out.push_str(self.open);
                offset = start + self.open.len();
            } else {
                out.push_str(&text[offset..start]);
                offset = start + self.open.len();

                let mut content = String::new();
                let mut closed = false;
                let mut cursor = offset;
                while let Some(rel) = text[cursor..].find(self.close) {
                    let end = cursor + rel;
                    if end > cursor && text.as_bytes()[end - 1] == b'\\' {
                        content.push_str(&text[cursor..end - 1]);
                        content.push_str(self.close);
                        cursor = end + self.close.len();
                    } else {
                        content.push_str(&text[cursor..end]);
                        cursor = end + self.close.len();
                        closed = true;
                        break;
                    }
                }

                if closed {
                    out.push_str(&handler.handle_token(&content)?);
                    offset = cursor;
                } else {
                    out.push_str(&handler.handle_unclosed(&text[start..])?);
                    offset = text.len();
                }
            }

            match text[offset..].find(self.open) {
                Some(rel) => start = offset + rel,
                None => break,
            }
        }

        if offset < text.len() {
            out.push_str(&text[offset..]);
        }
        Ok(out)
    }

    /// 宽松解析：处理器不会失败。
    pub(crate) fn replace(&self, text: &str, f: impl FnMut(&str) -> String) -> String {
        match self.parse(text, &mut FnHandler(f)) {
            Ok(s) => s,
            Err(never) => match never {},
        }
    }
}
