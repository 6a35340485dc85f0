// ==========================================
// 投资人批量导入 - 文件解析器实现
// ==========================================
// 阶段 0: 文件准入（类型/大小）→ 解码 → 逐字符扫描解析
// 支持: 逗号分隔文本，双引号转义（"" 表示字面引号）
// 不支持: 引号内换行（按行切分在先）
// ==========================================

use crate::domain::dataset::{ParsedTable, RawRow};
use crate::importer::error::{ImportError, ImporterResult, ParseError};
use crate::importer::importer_trait::FileParser;
use std::path::Path;
use tracing::{debug, instrument};

/// 默认文件大小上限: 5 MiB
pub const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

const CSV_MIME: &str = "text/csv";
const UTF8_BOM: char = '\u{feff}';

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按任一换行约定切分，丢弃空白行
    pub fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
        text.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
    }

    /// 单行切分（有状态扫描）
    ///
    /// - 未转义的 `"` 切换 in_quotes
    /// - 引号内的 `""` 输出一个字面 `"`，不切换状态
    /// - 引号外的 `,` 结束字段；引号内的 `,` 作为内容
    /// - 每个字段去首尾空白
    pub fn tokenize_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => {
                    fields.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            }
        }
        fields.push(current.trim().to_string());

        fields
    }

    /// 按位置将表头与行值拼接：少的补空串，多的丢弃
    ///
    /// columns 为表头行的原始切分结果；空表头列不产出键，其下的值被丢弃
    fn zip_row(columns: &[String], values: Vec<String>) -> RawRow {
        let mut values = values.into_iter();
        columns
            .iter()
            .filter_map(|h| {
                let value = values.next().unwrap_or_default();
                (!h.is_empty()).then(|| (h.clone(), value))
            })
            .collect()
    }
}

impl FileParser for CsvParser {
    fn parse_text(&self, text: &str) -> Result<ParsedTable, ParseError> {
        let mut lines = Self::non_blank_lines(text);

        let header_line = lines.next().ok_or(ParseError::EmptyFile)?;
        let columns = Self::tokenize_line(header_line);
        let headers: Vec<String> = columns.iter().filter(|h| !h.is_empty()).cloned().collect();
        if headers.is_empty() {
            return Err(ParseError::NoHeaders);
        }

        let rows: Vec<RawRow> = lines
            .map(|line| Self::zip_row(&columns, Self::tokenize_line(line)))
            .collect();

        debug!(headers = headers.len(), rows = rows.len(), "CSV 文本解析完成");
        Ok(ParsedTable { headers, rows })
    }
}

/// 解析 CSV 文本（零数据行不算错误，由调用方判定）
pub fn parse(text: &str) -> Result<ParsedTable, ParseError> {
    CsvParser.parse_text(text)
}

// ==========================================
// 文件准入与读取
// ==========================================

/// 已读取的文件
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub size_bytes: u64,
    pub text: String,
}

/// 文件准入检查：扩展名 .csv 或 MIME text/csv，且不超过大小上限
pub fn validate_file(
    file_name: &str,
    mime_type: Option<&str>,
    size_bytes: u64,
    max_file_bytes: u64,
) -> ImporterResult<()> {
    let is_csv_ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let is_csv_mime = mime_type
        .map(|m| m.trim().eq_ignore_ascii_case(CSV_MIME))
        .unwrap_or(false);

    if !is_csv_ext && !is_csv_mime {
        return Err(ImportError::UnsupportedFormat(file_name.to_string()));
    }

    if size_bytes > max_file_bytes {
        return Err(ImportError::FileTooLarge {
            size: size_bytes,
            limit: max_file_bytes,
        });
    }

    Ok(())
}

/// 字节解码为文本：UTF-8（非法序列替换），去掉开头 BOM
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes).into_owned();
    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// 读取本地文件（先查元数据做准入，再读内容）
#[instrument(skip_all, fields(path = %path.display()))]
pub async fn read_csv_file(path: &Path, max_file_bytes: u64) -> ImporterResult<SelectedFile> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let metadata = tokio::fs::metadata(path).await?;
    validate_file(&file_name, None, metadata.len(), max_file_bytes)?;

    let bytes = tokio::fs::read(path).await?;
    debug!(size = bytes.len(), "文件读取完成");

    Ok(SelectedFile {
        file_name,
        size_bytes: bytes.len() as u64,
        text: decode_text(&bytes),
    })
}
