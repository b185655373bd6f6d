//! SQL Flavor（方言）：决定 BoundSql 中位置占位符的写法。

use std::fmt;

/// 方言枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    MySQL,
    PostgreSQL,
    SQLite,
    SQLServer,
    Oracle,
}

impl Flavor {
    /// 写入第 `index_1_based` 个位置占位符。
    pub fn write_marker(self, index_1_based: usize, out: &mut String) {
        match self {
            Flavor::MySQL | Flavor::SQLite => out.push('?'),
            Flavor::PostgreSQL => {
                out.push('$');
                out.push_str(&index_1_based.to_string());
            }
            Flavor::SQLServer => {
                out.push_str("@p");
                out.push_str(&index_1_based.to_string());
            }
            Flavor::Oracle => {
                out.push(':');
                out.push_str(&index_1_based.to_string());
            }
        }
    }

    pub fn marker(self, index_1_based: usize) -> String {
        let mut s = String::new();
        self.write_marker(index_1_based, &mut s);
        s
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
            Self::Oracle => "Oracle",
        };
        f.write_str(s)
    }
}
