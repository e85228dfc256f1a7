//! Meal drafts, photos and the append-only meal entry record.
//!
//! A [`MealDraft`] is what the user is editing; it survives failed submissions
//! so the form stays populated. A [`MealEntry`] is built only after the photo
//! upload succeeded and is consumed by the spreadsheet append.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Timelike, Utc};
use url::Url;

/// Input format of the meal time field (`2024-01-01T08:00`).
pub const MEAL_TIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Human-readable meal time written to the spreadsheet (`1/1/2024, 8:00:00 AM`).
const MEAL_TIME_DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Prefix of every uploaded photo name.
const UPLOAD_NAME_PREFIX: &str = "food";

/// Reasons a draft is refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealDraftValidationError {
    /// Meal name was missing or blank once trimmed.
    BlankName,
    /// No photo bytes were supplied.
    EmptyPhoto,
    /// The chosen file is not an image.
    NotAnImage {
        /// MIME type detected for the chosen file.
        mime_type: String,
    },
    /// Meal time did not match [`MEAL_TIME_INPUT_FORMAT`].
    InvalidMealTime {
        /// Raw value supplied by the user.
        raw: String,
    },
}

impl fmt::Display for MealDraftValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankName => write!(f, "Please enter the name of the food"),
            Self::EmptyPhoto => write!(f, "Please select an image"),
            Self::NotAnImage { mime_type } => {
                write!(f, "Please select an image (got a {mime_type} file)")
            }
            Self::InvalidMealTime { raw } => {
                write!(f, "Meal time '{raw}' must look like 2024-01-01T08:00")
            }
        }
    }
}

impl std::error::Error for MealDraftValidationError {}

/// User-editable meal form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealDraft {
    /// Name of the food.
    pub name: String,
    /// Free-form description; may be empty.
    pub description: String,
    /// Local wall-clock time the meal was eaten, minute precision.
    pub meal_time: NaiveDateTime,
}

impl MealDraft {
    /// Build a draft from form values.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        meal_time: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            meal_time,
        }
    }

    /// A blank draft whose meal time defaults to `now`.
    #[must_use]
    pub fn blank(now: DateTime<Local>) -> Self {
        Self::new("", "", default_meal_time(now))
    }

    /// Check the draft and chosen photo before any network call.
    ///
    /// # Errors
    ///
    /// Returns the first rule the inputs break.
    pub fn validate(&self, photo: &PhotoFile) -> Result<(), MealDraftValidationError> {
        if photo.bytes.is_empty() {
            return Err(MealDraftValidationError::EmptyPhoto);
        }
        if !photo.is_image() {
            return Err(MealDraftValidationError::NotAnImage {
                mime_type: photo.mime_type.clone(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(MealDraftValidationError::BlankName);
        }
        Ok(())
    }
}

/// Local time truncated to the minute, the default for a new draft.
#[must_use]
pub fn default_meal_time(now: DateTime<Local>) -> NaiveDateTime {
    let naive = now.naive_local();
    naive
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(naive)
}

/// Parse a meal time typed as `YYYY-MM-DDTHH:MM`.
///
/// # Examples
/// ```
/// use food_tracker::domain::parse_meal_time;
///
/// let parsed = parse_meal_time(" 2024-01-01T08:00 ").unwrap();
/// assert_eq!(parsed.to_string(), "2024-01-01 08:00:00");
/// assert!(parse_meal_time("yesterday").is_err());
/// ```
///
/// # Errors
///
/// Returns [`MealDraftValidationError::InvalidMealTime`] for any other shape.
pub fn parse_meal_time(raw: &str) -> Result<NaiveDateTime, MealDraftValidationError> {
    NaiveDateTime::parse_from_str(raw.trim(), MEAL_TIME_INPUT_FORMAT).map_err(|_| {
        MealDraftValidationError::InvalidMealTime {
            raw: raw.trim().to_owned(),
        }
    })
}

/// Render a meal time for the form prompt.
#[must_use]
pub fn format_meal_time_input(meal_time: NaiveDateTime) -> String {
    meal_time.format(MEAL_TIME_INPUT_FORMAT).to_string()
}

/// Photo chosen by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoFile {
    /// Original file name, without directories.
    pub file_name: String,
    /// Detected MIME type.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    /// Wrap file contents read from disk.
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Whether the MIME type is in the `image/*` family.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.split_once('/').is_some_and(|(kind, subtype)| {
            kind.eq_ignore_ascii_case("image") && !subtype.is_empty()
        })
    }

    /// Object name for an upload captured at `captured_at`.
    ///
    /// The epoch-millisecond stamp keeps repeated uploads of the same file
    /// distinct.
    #[must_use]
    pub fn upload_name(&self, captured_at: DateTime<Utc>) -> String {
        format!(
            "{UPLOAD_NAME_PREFIX}_{}_{}",
            captured_at.timestamp_millis(),
            self.file_name
        )
    }
}

impl fmt::Debug for PhotoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Append-only meal record, built once the photo upload is confirmed.
///
/// ## Invariants
/// - `photo_uri` always references an object the store acknowledged.
/// - Immutable after construction; the system never updates or deletes rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealEntry {
    captured_at: DateTime<Utc>,
    name: String,
    description: String,
    meal_time: NaiveDateTime,
    photo_uri: Url,
}

impl MealEntry {
    /// Freeze a draft together with its uploaded photo link.
    #[must_use]
    pub fn new(draft: &MealDraft, captured_at: DateTime<Utc>, photo_uri: Url) -> Self {
        Self {
            captured_at,
            name: draft.name.clone(),
            description: draft.description.clone(),
            meal_time: draft.meal_time,
            photo_uri,
        }
    }

    /// When the submission started.
    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Name of the food.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Local wall-clock meal time.
    #[must_use]
    pub const fn meal_time(&self) -> NaiveDateTime {
        self.meal_time
    }

    /// Shareable link to the uploaded photo.
    #[must_use]
    pub const fn photo_uri(&self) -> &Url {
        &self.photo_uri
    }

    /// Spreadsheet row: capture stamp, name, description, meal time, photo link.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use food_tracker::domain::{MealDraft, MealEntry, parse_meal_time};
    /// use url::Url;
    ///
    /// let draft = MealDraft::new("Oatmeal", "", parse_meal_time("2024-01-01T08:00").unwrap());
    /// let captured_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    /// let uri = Url::parse("https://drive.google.com/uc?id=abc123").unwrap();
    /// let row = MealEntry::new(&draft, captured_at, uri).to_row();
    /// assert_eq!(row, [
    ///     "2024-01-01T08:00:00.000Z",
    ///     "Oatmeal",
    ///     "",
    ///     "1/1/2024, 8:00:00 AM",
    ///     "https://drive.google.com/uc?id=abc123",
    /// ]);
    /// ```
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.name.clone(),
            self.description.clone(),
            self.meal_time.format(MEAL_TIME_DISPLAY_FORMAT).to_string(),
            self.photo_uri.to_string(),
        ]
    }
}
