use anyhow::{anyhow, bail, Context, Result};
use mapchat_common::{Coordinates, MapStyle};
use mapchat_links::{ParsedMessage, TextSegment};

pub const HELP: &str = "\
Commands:
  pan LAT LNG [ZOOM]   move the map as if dragged (small moves are ignored)
  go LAT LNG [ZOOM]    jump to a place
  style NAME           standard | satellite | relief | dark
  ask TEXT             ask the assistant
  open N               follow link N of the last reply
  state                print the current map view
  help                 show this text
  quit                 exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pan { center: Coordinates, zoom: Option<f64> },
    Go { center: Coordinates, zoom: Option<f64> },
    Style(MapStyle),
    Ask(String),
    /// 1-based link index.
    Open(usize),
    State,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "pan" => {
                let (center, zoom) = position(rest)?;
                Command::Pan { center, zoom }
            }
            "go" => {
                let (center, zoom) = position(rest)?;
                Command::Go { center, zoom }
            }
            "style" => Command::Style(rest.parse()?),
            "ask" => {
                if rest.is_empty() {
                    bail!("usage: ask TEXT");
                }
                Command::Ask(rest.to_string())
            }
            "open" => {
                let n: usize = rest.parse().context("usage: open N")?;
                if n == 0 {
                    bail!("links are numbered from 1");
                }
                Command::Open(n)
            }
            "state" => Command::State,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{other}', try 'help'"),
        };
        Ok(Some(command))
    }
}

/// `LAT LNG [ZOOM]`
fn position(args: &str) -> Result<(Coordinates, Option<f64>)> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if !(2..=3).contains(&parts.len()) {
        bail!("expected LAT LNG [ZOOM]");
    }
    let number = |s: &str| -> Result<f64> {
        let v: f64 = s.parse().map_err(|_| anyhow!("'{s}' is not a number"))?;
        if !v.is_finite() {
            bail!("'{s}' is not a finite number");
        }
        Ok(v)
    };

    let center = Coordinates::new(number(parts[0])?, number(parts[1])?);
    if !center.in_range() {
        bail!("coordinates out of range: {center}");
    }
    let zoom = parts.get(2).map(|z| number(z)).transpose()?;
    Ok((center, zoom))
}

/// Reply text with each link shown as `label[n]`, followed by the numbered link targets.
pub fn render_reply(parsed: &ParsedMessage) -> String {
    let mut out = String::new();
    let mut n = 0;
    for segment in &parsed.segments {
        match segment {
            TextSegment::Text { content } => out.push_str(content),
            TextSegment::Link { label, .. } => {
                n += 1;
                out.push_str(&format!("{label}[{n}]"));
            }
        }
    }

    let mut out = out.trim_end().to_string();
    if parsed.links.is_empty() {
        return out;
    }

    out.push('\n');
    for (i, link) in parsed.links.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {} ({})", i + 1, link.name, link.coordinates));
        if let Some(z) = link.zoom {
            out.push_str(&format!(" zoom {z}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapchat_links::parse_message;

    #[test]
    fn parses_movement() {
        assert_eq!(
            Command::parse("pan 40.78 -73.96").unwrap(),
            Some(Command::Pan {
                center: Coordinates::new(40.78, -73.96),
                zoom: None
            })
        );
        assert_eq!(
            Command::parse("  GO 48.8606 2.3376 16 ").unwrap(),
            Some(Command::Go {
                center: Coordinates::new(48.8606, 2.3376),
                zoom: Some(16.0)
            })
        );
    }

    #[test]
    fn rejects_bad_positions() {
        assert!(Command::parse("go 40.7").is_err());
        assert!(Command::parse("go north 12").is_err());
        assert!(Command::parse("go 95 0").is_err());
        assert!(Command::parse("go NaN 0").is_err());
    }

    #[test]
    fn parses_the_rest() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(
            Command::parse("style Satellite").unwrap(),
            Some(Command::Style(MapStyle::Satellite))
        );
        assert_eq!(
            Command::parse("ask what is nearby?").unwrap(),
            Some(Command::Ask("what is nearby?".into()))
        );
        assert_eq!(Command::parse("open 2").unwrap(), Some(Command::Open(2)));
        assert!(Command::parse("open 0").is_err());
        assert!(Command::parse("ask").is_err());
        assert!(Command::parse("fly 1 2").is_err());
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn renders_links_with_numbers() {
        let parsed = parse_message(
            "Visit [Central Park](geo:40.7812,-73.9665?zoom=14) and [Pier](geo:40.7,-74.0).",
        );
        assert_eq!(
            render_reply(&parsed),
            "Visit Central Park[1] and Pier[2].\n\n  [1] Central Park (40.781200, -73.966500) zoom 14\n  [2] Pier (40.700000, -74.000000)"
        );
    }

    #[test]
    fn renders_plain_text_unchanged() {
        assert_eq!(render_reply(&parse_message("Hello!\n\n")), "Hello!");
    }
}
