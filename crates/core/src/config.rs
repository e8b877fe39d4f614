//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! request handling never reads process-wide environment variables.

use crate::timeline::{TimelineOptions, TrackGrouping, ZoomLevel};
use crate::{TrackerError, TrackerResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
    default_zoom: ZoomLevel,
    track_grouping: TrackGrouping,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidInput`] if `data_file` is empty or names an existing
    /// directory.
    pub fn new(
        data_file: PathBuf,
        default_zoom: ZoomLevel,
        track_grouping: TrackGrouping,
    ) -> TrackerResult<Self> {
        if data_file.as_os_str().is_empty() {
            return Err(TrackerError::InvalidInput(
                "data file path cannot be empty".into(),
            ));
        }
        if data_file.is_dir() {
            return Err(TrackerError::InvalidInput(format!(
                "data file path is a directory: {}",
                data_file.display()
            )));
        }

        Ok(Self {
            data_file,
            default_zoom,
            track_grouping,
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn default_zoom(&self) -> ZoomLevel {
        self.default_zoom
    }

    pub fn track_grouping(&self) -> TrackGrouping {
        self.track_grouping
    }

    /// Timeline options with per-request overrides applied over the configured defaults.
    pub fn timeline_options(
        &self,
        zoom: Option<ZoomLevel>,
        grouping: Option<TrackGrouping>,
    ) -> TimelineOptions {
        TimelineOptions {
            zoom: zoom.unwrap_or(self.default_zoom),
            grouping: grouping.unwrap_or(self.track_grouping),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the default zoom level from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`ZoomLevel::Week`].
pub fn zoom_from_env_value(value: Option<String>) -> TrackerResult<ZoomLevel> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<ZoomLevel>())
        .transpose()?;
    Ok(parsed.unwrap_or_default())
}

/// Parse the track grouping mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`TrackGrouping::Exact`].
pub fn grouping_from_env_value(value: Option<String>) -> TrackerResult<TrackGrouping> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<TrackGrouping>())
        .transpose()?;
    Ok(parsed.unwrap_or_default())
}

/// Resolve the treatment store path, falling back to [`crate::DEFAULT_DATA_FILE`].
pub fn data_file_from_env_value(value: Option<String>) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(crate::DEFAULT_DATA_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_env_values_fall_back_to_defaults() {
        assert_eq!(zoom_from_env_value(None).unwrap(), ZoomLevel::Week);
        assert_eq!(
            zoom_from_env_value(Some("   ".into())).unwrap(),
            ZoomLevel::Week
        );
        assert_eq!(
            grouping_from_env_value(Some(String::new())).unwrap(),
            TrackGrouping::Exact
        );
        assert_eq!(
            data_file_from_env_value(None),
            PathBuf::from(crate::DEFAULT_DATA_FILE)
        );
    }

    #[test]
    fn env_values_are_parsed() {
        assert_eq!(
            zoom_from_env_value(Some("month".into())).unwrap(),
            ZoomLevel::Month
        );
        assert_eq!(
            grouping_from_env_value(Some("normalised".into())).unwrap(),
            TrackGrouping::Normalised
        );
        assert_eq!(
            data_file_from_env_value(Some(" /tmp/t.json ".into())),
            PathBuf::from("/tmp/t.json")
        );
        assert!(zoom_from_env_value(Some("fortnight".into())).is_err());
    }

    #[test]
    fn config_rejects_empty_or_directory_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(CoreConfig::new(PathBuf::new(), ZoomLevel::Week, TrackGrouping::Exact).is_err());
        assert!(CoreConfig::new(
            dir.path().to_path_buf(),
            ZoomLevel::Week,
            TrackGrouping::Exact
        )
        .is_err());
    }

    #[test]
    fn request_overrides_win_over_defaults() {
        let cfg = CoreConfig::new(
            PathBuf::from("treatments.json"),
            ZoomLevel::Day,
            TrackGrouping::Normalised,
        )
        .unwrap();

        let defaults = cfg.timeline_options(None, None);
        assert_eq!(defaults.zoom, ZoomLevel::Day);
        assert_eq!(defaults.grouping, TrackGrouping::Normalised);

        let overridden = cfg.timeline_options(Some(ZoomLevel::Month), Some(TrackGrouping::Exact));
        assert_eq!(overridden.zoom, ZoomLevel::Month);
        assert_eq!(overridden.grouping, TrackGrouping::Exact);
    }
}
