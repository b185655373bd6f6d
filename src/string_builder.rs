//! 字符串拼接工具。

#[derive(Debug, Default, Clone)]
pub(crate) struct StringBuilder {
    buf: String,
    segments: usize,
}

impl StringBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 以片段方式写入：除第一个片段外，先写入一个空格。空片段也计数。
    pub(crate) fn write_segment(&mut self, s: &str) {
        if self.segments > 0 {
            self.buf.push(' ');
        }
        self.buf.push_str(s);
        self.segments += 1;
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buf
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}

/// 把连续空白压缩成单个空格，并去掉首尾空白。
pub(crate) fn shrink_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}
