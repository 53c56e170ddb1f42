use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    MultiLine,
    Secret,
    /// 整数，带闭区间
    Number { min: u32, max: u32 },
    Date,
    Choice(Vec<&'static str>),
    /// 逗号分隔的本地文件路径
    Files,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl FormField {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let value = match &kind {
            FieldKind::Choice(opts) => opts.first().map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        };
        Self {
            key,
            label,
            value,
            required: false,
            kind,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// 选择项左右切换
    pub fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(opts) = &self.kind else {
            return;
        };
        if opts.is_empty() {
            return;
        }
        let cur = opts
            .iter()
            .position(|o| o.eq_ignore_ascii_case(self.value.trim()));
        let next = match (cur, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % opts.len(),
            (Some(i), false) => (i + opts.len() - 1) % opts.len(),
        };
        self.value = opts[next].to_string();
    }

    /// 单字段校验；空值只在 required 时报错
    pub fn check(&self) -> Result<(), String> {
        if self.is_blank() {
            return if self.required {
                Err(format!("{} 不能为空", self.label))
            } else {
                Ok(())
            };
        }
        let v = self.value.trim();
        match &self.kind {
            FieldKind::Number { min, max } => match v.parse::<u32>() {
                Ok(n) if n >= *min && n <= *max => Ok(()),
                Ok(_) => Err(format!("{} 必须在 {} 到 {} 之间", self.label, min, max)),
                Err(_) => Err(format!("{} 必须是整数", self.label)),
            },
            FieldKind::Date => NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| format!("{} 格式应为 YYYY-MM-DD", self.label)),
            FieldKind::Choice(opts) => {
                if opts.iter().any(|o| o.eq_ignore_ascii_case(v)) {
                    Ok(())
                } else {
                    Err(format!("{} 只能是: {}", self.label, opts.join(" / ")))
                }
            }
            FieldKind::Files => {
                for p in split_paths(v) {
                    if !p.is_file() {
                        return Err(format!("{} 文件不存在: {}", self.label, p.display()));
                    }
                }
                Ok(())
            }
            FieldKind::Text | FieldKind::MultiLine | FieldKind::Secret => Ok(()),
        }
    }

    pub fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            _ => self.value.clone(),
        }
    }
}

pub fn split_paths(s: &str) -> Vec<PathBuf> {
    s.split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}
