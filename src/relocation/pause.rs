use std::path::PathBuf;

/// Manual pause for a relocation run.
///
/// Paused while the configured flag is set or the pause file exists. The flag
/// is fixed for the run; the file is checked on every call, so touching or
/// removing it takes effect before the next item.
#[derive(Debug, Clone, Default)]
pub struct PauseSwitch {
    paused: bool,
    file: Option<PathBuf>,
}

impl PauseSwitch {
    pub const fn new(paused: bool, file: Option<PathBuf>) -> Self {
        Self { paused, file }
    }

    pub fn is_paused(&self) -> bool {
        self.paused || self.file.as_ref().is_some_and(|f| f.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flag() {
        assert!(!PauseSwitch::default().is_paused());
        assert!(PauseSwitch::new(true, None).is_paused());
    }

    #[test]
    fn test_flag_wins_over_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let switch = PauseSwitch::new(true, Some(temp_dir.path().join("pause")));
        assert!(switch.is_paused());
    }

    #[test]
    fn test_pause_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("pause");
        let switch = PauseSwitch::new(false, Some(file.clone()));

        assert!(!switch.is_paused());
        fs::write(&file, "").unwrap();
        assert!(switch.is_paused());
        fs::remove_file(&file).unwrap();
        assert!(!switch.is_paused());
    }
}
