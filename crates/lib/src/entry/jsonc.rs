//! Comment stripping for JSON-with-comments descriptors.
//!
//! Line (`//`) and block (`/* */`) comments outside of string literals are
//! replaced with spaces. Newlines are kept so that parse errors still point at
//! the right line.

/// Strip comments from a JSON-with-comments document.
pub fn strip_comments(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut chars = input.chars().peekable();
  let mut in_string = false;

  while let Some(c) = chars.next() {
    if in_string {
      out.push(c);
      match c {
        '\\' => {
          if let Some(escaped) = chars.next() {
            out.push(escaped);
          }
        }
        '"' => in_string = false,
        _ => {}
      }
      continue;
    }

    match (c, chars.peek()) {
      ('"', _) => {
        in_string = true;
        out.push(c);
      }
      ('/', Some('/')) => {
        chars.next();
        out.push_str("  ");
        while let Some(&next) = chars.peek() {
          if next == '\n' {
            break;
          }
          chars.next();
          out.push(' ');
        }
      }
      ('/', Some('*')) => {
        chars.next();
        out.push_str("  ");
        let mut prev = '\0';
        for next in chars.by_ref() {
          if prev == '*' && next == '/' {
            out.push(' ');
            break;
          }
          out.push(if next == '\n' { '\n' } else { ' ' });
          prev = next;
        }
      }
      _ => out.push(c),
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strips_line_comments() {
    let stripped = strip_comments("{\n  // mode\n  \"mode\": \"RAW\" // trailing\n}");
    let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
    assert_eq!(value["mode"], "RAW");
    assert_eq!(stripped.lines().count(), 4);
  }

  #[test]
  fn strips_block_comments() {
    let stripped = strip_comments("{/* a\n b */\"debug\": true}");
    let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
    assert_eq!(value["debug"], true);
    assert!(stripped.contains('\n'));
  }

  #[test]
  fn keeps_comment_markers_inside_strings() {
    let input = r#"{"uri": "https://cdn.example.com/%s.js", "note": "a /* b */ \" // c"}"#;
    assert_eq!(strip_comments(input), input);
  }

  #[test]
  fn unterminated_block_comment_consumes_rest() {
    assert_eq!(strip_comments("{} /* open").trim(), "{}");
  }
}
