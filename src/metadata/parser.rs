use tracing::warn;

use crate::errors::{AppError, AppResult};

/// A single recognized manifest declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Maintainer(String),
    MaintainerEmail(String),
    License(String),
    Description(String),
    LongDescription(LongDescriptionSource),
    Version(String),
    Depends {
        name: String,
        constraint: Option<String>,
    },
    Supports(Vec<String>),
}

/// Where the long description text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LongDescriptionSource {
    /// Literal text in the manifest itself.
    Inline(String),
    /// Name of a co-located document, read at load time.
    File(String),
}

/// An open `%w{ ... }.each do |var|` platform block.
struct PlatformBlock {
    platforms: Vec<String>,
    var: String,
    emitted: bool,
}

/// Parses manifest source text into its declarations.
///
/// The platform word list is extracted statically; no part of the manifest is
/// ever executed. Unknown keys are skipped with a warning, malformed known
/// declarations fail the whole parse.
pub fn parse_manifest(source: &str) -> AppResult<Vec<Declaration>> {
    let mut declarations = Vec::new();
    let mut block: Option<PlatformBlock> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(mut active) = block.take() {
            if line == "end" {
                if active.emitted {
                    declarations.push(Declaration::Supports(active.platforms));
                }
                continue;
            }

            let (key, rest) = split_declaration(line);
            if key == "supports" && rest == active.var {
                active.emitted = true;
                block = Some(active);
                continue;
            }

            return Err(parse_error(
                line_no,
                "only `supports <var>` is allowed inside a platform block",
            ));
        }

        if line.contains("%w{") || line.contains("%w[") {
            block = Some(parse_platform_block_header(line, line_no)?);
            continue;
        }

        let (key, rest) = split_declaration(line);
        match key {
            "maintainer" => {
                declarations.push(Declaration::Maintainer(single_string(rest, line_no)?))
            }
            "maintainer_email" => {
                declarations.push(Declaration::MaintainerEmail(single_string(rest, line_no)?))
            }
            "license" => declarations.push(Declaration::License(single_string(rest, line_no)?)),
            "description" => {
                declarations.push(Declaration::Description(single_string(rest, line_no)?))
            }
            "version" => declarations.push(Declaration::Version(single_string(rest, line_no)?)),
            "long_description" => declarations.push(Declaration::LongDescription(
                long_description_source(rest, line_no)?,
            )),
            "depends" => {
                let mut parts = quoted_strings(rest, line_no)?;
                match parts.len() {
                    1 => declarations.push(Declaration::Depends {
                        name: parts.remove(0),
                        constraint: None,
                    }),
                    2 => {
                        let name = parts.remove(0);
                        declarations.push(Declaration::Depends {
                            name,
                            constraint: Some(parts.remove(0)),
                        });
                    }
                    _ => {
                        return Err(parse_error(
                            line_no,
                            "expected a dependency name and optional version constraint",
                        ))
                    }
                }
            }
            "supports" => {
                declarations.push(Declaration::Supports(vec![single_string(rest, line_no)?]))
            }
            _ => warn!("ignoring unknown declaration `{}` on line {}", key, line_no),
        }
    }

    if block.is_some() {
        return Err(parse_error(
            source.lines().count(),
            "platform block is missing its `end`",
        ));
    }

    Ok(declarations)
}

fn parse_error(line: usize, message: impl Into<String>) -> AppError {
    AppError::Parse {
        line,
        message: message.into(),
    }
}

fn split_declaration(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(ix) => (&line[..ix], line[ix..].trim_start()),
        None => (line, ""),
    }
}

/// Extracts the quoted segments of a declaration argument list. Single and
/// double quotes are treated alike; there is no escape syntax.
fn quoted_strings(rest: &str, line: usize) -> AppResult<Vec<String>> {
    let mut parts = Vec::new();
    let mut chars = rest.char_indices();

    while let Some((ix, c)) = chars.next() {
        if c == '\'' || c == '"' {
            let mut value = String::new();
            let mut closed = false;
            for (_, inner) in chars.by_ref() {
                if inner == c {
                    closed = true;
                    break;
                }
                value.push(inner);
            }
            if !closed {
                return Err(parse_error(
                    line,
                    format!("unterminated string starting at column {}", ix + 1),
                ));
            }
            parts.push(value);
        }
    }

    Ok(parts)
}

fn single_string(rest: &str, line: usize) -> AppResult<String> {
    let mut parts = quoted_strings(rest, line)?;
    if parts.len() != 1 {
        return Err(parse_error(line, "expected exactly one quoted string"));
    }
    Ok(parts.remove(0))
}

fn long_description_source(rest: &str, line: usize) -> AppResult<LongDescriptionSource> {
    if rest.starts_with('\'') || rest.starts_with('"') {
        return Ok(LongDescriptionSource::Inline(single_string(rest, line)?));
    }

    // `IO.read(File.join(File.dirname(__FILE__), 'README.rdoc'))` names a
    // co-located document; the last quoted segment is the file name.
    if rest.contains("IO.read") {
        let parts = quoted_strings(rest, line)?;
        return match parts.last() {
            Some(file) if !file.is_empty() => Ok(LongDescriptionSource::File(file.clone())),
            _ => Err(parse_error(line, "IO.read source names no document")),
        };
    }

    Err(parse_error(
        line,
        "expected a quoted string or an IO.read source",
    ))
}

fn parse_platform_block_header(line: &str, line_no: usize) -> AppResult<PlatformBlock> {
    let (open, close) = if line.contains("%w{") {
        ("%w{", '}')
    } else {
        ("%w[", ']')
    };

    let Some(start) = line.find(open).map(|ix| ix + open.len()) else {
        return Err(parse_error(line_no, "malformed word list"));
    };
    let Some(end) = line[start..].find(close) else {
        return Err(parse_error(
            line_no,
            "word list is missing its closing delimiter",
        ));
    };

    let platforms: Vec<String> = line[start..start + end]
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let tail = &line[start + end + 1..];
    if !tail.contains(".each") || !tail.contains("do") {
        return Err(parse_error(
            line_no,
            "expected `.each do |var|` after the word list",
        ));
    }

    let Some(var_start) = tail.find('|') else {
        return Err(parse_error(line_no, "missing block variable"));
    };
    let Some(var_len) = tail[var_start + 1..].find('|') else {
        return Err(parse_error(line_no, "missing block variable"));
    };
    let var = tail[var_start + 1..var_start + 1 + var_len].trim().to_string();
    if var.is_empty() {
        return Err(parse_error(line_no, "missing block variable"));
    }

    Ok(PlatformBlock {
        platforms,
        var,
        emitted: false,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ETCKEEPER_MANIFEST: &str = r#"maintainer       "Promet Solutions"
maintainer_email "marius@promethost.com"
license          "Apache 2.0"
description      "Installs/Configures etckeeper"
long_description IO.read(File.join(File.dirname(__FILE__), 'README.rdoc'))
version          "0.1"
depends          "git"

%w{ ubuntu debian }.each do |os|
  supports os
end
"#;

    #[test]
    fn parses_every_declaration_kind() {
        let declarations = parse_manifest(ETCKEEPER_MANIFEST).unwrap();
        assert_eq!(
            declarations,
            vec![
                Declaration::Maintainer("Promet Solutions".to_string()),
                Declaration::MaintainerEmail("marius@promethost.com".to_string()),
                Declaration::License("Apache 2.0".to_string()),
                Declaration::Description("Installs/Configures etckeeper".to_string()),
                Declaration::LongDescription(LongDescriptionSource::File(
                    "README.rdoc".to_string()
                )),
                Declaration::Version("0.1".to_string()),
                Declaration::Depends {
                    name: "git".to_string(),
                    constraint: None,
                },
                Declaration::Supports(vec!["ubuntu".to_string(), "debian".to_string()]),
            ]
        );
    }

    #[test]
    fn accepts_single_quoted_strings() {
        let declarations = parse_manifest("license 'Apache 2.0'").unwrap();
        assert_eq!(
            declarations,
            vec![Declaration::License("Apache 2.0".to_string())]
        );
    }

    #[test]
    fn accepts_inline_long_description() {
        let declarations = parse_manifest(r#"long_description "A longer story""#).unwrap();
        assert_eq!(
            declarations,
            vec![Declaration::LongDescription(LongDescriptionSource::Inline(
                "A longer story".to_string()
            ))]
        );
    }

    #[test]
    fn parses_constrained_dependency() {
        let declarations = parse_manifest(r#"depends "git", ">= 1.7""#).unwrap();
        assert_eq!(
            declarations,
            vec![Declaration::Depends {
                name: "git".to_string(),
                constraint: Some(">= 1.7".to_string()),
            }]
        );
    }

    #[test]
    fn parses_standalone_supports_lines() {
        let declarations = parse_manifest("supports \"ubuntu\"\nsupports \"debian\"").unwrap();
        assert_eq!(
            declarations,
            vec![
                Declaration::Supports(vec!["ubuntu".to_string()]),
                Declaration::Supports(vec!["debian".to_string()]),
            ]
        );
    }

    #[test]
    fn parses_bracketed_word_list() {
        let source = "%w[ ubuntu debian ].each do |os|\n  supports os\nend";
        let declarations = parse_manifest(source).unwrap();
        assert_eq!(
            declarations,
            vec![Declaration::Supports(vec![
                "ubuntu".to_string(),
                "debian".to_string()
            ])]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let source = "# cookbook metadata\n\nversion \"0.1\"\n";
        let declarations = parse_manifest(source).unwrap();
        assert_eq!(declarations, vec![Declaration::Version("0.1".to_string())]);
    }

    #[test]
    fn ignores_unknown_keys() {
        let source = "recipe \"etckeeper\", \"Installs etckeeper\"\nversion \"0.1\"";
        let declarations = parse_manifest(source).unwrap();
        assert_eq!(declarations, vec![Declaration::Version("0.1".to_string())]);
    }

    #[test]
    fn rejects_unterminated_string() {
        let result = parse_manifest("license \"Apache 2.0");
        assert!(matches!(result, Err(AppError::Parse { line: 1, .. })));
    }

    #[test]
    fn rejects_unquoted_argument() {
        let result = parse_manifest("version 0.1");
        assert!(matches!(result, Err(AppError::Parse { line: 1, .. })));
    }

    #[test]
    fn rejects_bare_identifier_outside_platform_block() {
        let result = parse_manifest("supports os");
        assert!(matches!(result, Err(AppError::Parse { line: 1, .. })));
    }

    #[test]
    fn rejects_foreign_statement_inside_platform_block() {
        let source = "%w{ ubuntu }.each do |os|\n  puts os\nend";
        let result = parse_manifest(source);
        assert!(matches!(result, Err(AppError::Parse { line: 2, .. })));
    }

    #[test]
    fn rejects_platform_block_without_end() {
        let source = "%w{ ubuntu debian }.each do |os|\n  supports os\n";
        let result = parse_manifest(source);
        assert!(matches!(result, Err(AppError::Parse { .. })));
    }

    #[test]
    fn reports_the_failing_line_number() {
        let source = "version \"0.1\"\nlicense \"Apache";
        match parse_manifest(source) {
            Err(AppError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
