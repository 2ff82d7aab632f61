/// Selects the source lines for which a pass prints its trace.  Lines are
/// 1-based and ranges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TracingConfig {
    All,
    Between(usize, usize),
    Before(usize),
    After(usize),
    Only(usize),
    Off,
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig::Off
    }
}

impl TracingConfig {
    /**
     Parses a command line trace option: `all`, a single line `N`, or an
     inclusive range `N..M`, `..M` or `N..`.  No option turns tracing off.
    */
    pub fn parse(text: Option<&str>) -> Result<TracingConfig, String> {
        let text = match text {
            None => return Ok(TracingConfig::Off),
            Some(text) => text.trim(),
        };
        let line = |s: &str| {
            s.parse::<usize>()
                .map_err(|_| format!("Invalid line number in trace option: {}", s))
        };

        match text.split_once("..") {
            _ if text == "all" => Ok(TracingConfig::All),
            None => line(text).map(TracingConfig::Only),
            Some(("", "")) => Ok(TracingConfig::All),
            Some(("", end)) => line(end).map(TracingConfig::Before),
            Some((start, "")) => line(start).map(TracingConfig::After),
            Some((start, end)) => {
                let (start, end) = (line(start)?, line(end)?);
                if start <= end {
                    Ok(TracingConfig::Between(start, end))
                } else {
                    Err(format!("Empty trace range: {}..{}", start, end))
                }
            }
        }
    }

    /// True when `line` is selected for tracing.
    pub fn includes(&self, line: usize) -> bool {
        match *self {
            TracingConfig::All => true,
            TracingConfig::After(start) => start <= line,
            TracingConfig::Before(end) => line <= end,
            TracingConfig::Between(start, end) => start <= line && line <= end,
            TracingConfig::Only(only) => line == only,
            TracingConfig::Off => false,
        }
    }
}

pub trait Tracing {
    fn set_tracing(&mut self, config: TracingConfig);
}
