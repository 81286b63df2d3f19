/// Reduce an argument string to the flags in `keep_flags`.
///
/// Kept flags retain their value (`--to html5` or `--to=html5`), with any
/// `+extension` / `-extension` suffix stripped from format values. Returns
/// `baseline` when no flag survives.
pub fn simplify_args(args: &str, keep_flags: &[String], baseline: &str) -> String {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let mut kept = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        i += 1;

        if !token.starts_with('-') {
            continue;
        }

        let (flag, inline_value) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (token, None),
        };
        let keep = keep_flags.iter().any(|k| k == flag);

        // A following non-flag token is this flag's value.
        let value = match inline_value {
            Some(v) => Some(v),
            None if i < tokens.len() && !tokens[i].starts_with('-') => {
                i += 1;
                Some(tokens[i - 1])
            }
            None => None,
        };

        if !keep {
            continue;
        }

        kept.push(flag.to_string());
        if let Some(v) = value {
            kept.push(strip_extensions(v).to_string());
        }
    }

    if kept.is_empty() {
        baseline.to_string()
    } else {
        kept.join(" ")
    }
}

fn strip_extensions(value: &str) -> &str {
    match value.find(['+', '-']) {
        Some(0) | None => value,
        Some(idx) => &value[..idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keep() -> Vec<String> {
        ["--from", "--to", "--mathml", "--standalone"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_drops_advanced_flags_and_extensions() {
        let args = "--from latex+raw_tex --to html5 --mathml --standalone \
                    --number-sections --filter pandoc-crossref";
        assert_eq!(
            simplify_args(args, &keep(), "--from latex"),
            "--from latex --to html5 --mathml --standalone"
        );
    }

    #[test]
    fn test_inline_values() {
        let args = "--from=latex-smart --to=html5 --toc";
        assert_eq!(
            simplify_args(args, &keep(), "--from latex"),
            "--from latex --to html5"
        );
    }

    #[test]
    fn test_falls_back_to_baseline() {
        assert_eq!(
            simplify_args("--toc --filter x", &keep(), "--from latex --to html5"),
            "--from latex --to html5"
        );
        assert_eq!(
            simplify_args("", &keep(), "--from latex --to html5"),
            "--from latex --to html5"
        );
    }
}
