//! Interactive session: one sign-in, many entries.
//!
//! Each round prompts for the form fields. Pressing enter keeps the value
//! shown in brackets, so a failed entry can be resubmitted unchanged; `-`
//! clears a kept description. A successful save clears the form and resets the meal time to now. The
//! session ends at end of input or when the name prompt receives `quit`.

use std::io::{self, Write};
use std::path::PathBuf;

use mockable::Clock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use super::app::App;
use super::photo::load_photo;
use crate::domain::{MealDraft, format_meal_time_input, parse_meal_time};

const QUIT: &str = "quit";
const CLEAR: &str = "-";

/// Form values kept between rounds.
struct Form {
    draft: MealDraft,
    photo_path: Option<PathBuf>,
}

/// Run rounds until input ends. Returns how many entries were saved.
///
/// # Errors
///
/// Returns an error only when reading input fails.
pub async fn run_session<R, W>(app: &mut App<W>, input: R, clock: &dyn Clock) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();
    let mut form = Form {
        draft: MealDraft::blank(clock.local()),
        photo_path: None,
    };
    let mut saved = 0;

    if !app.sign_in().await {
        app.presenter()
            .notice("You can keep going; sign-in will be retried when you save.");
    }

    while fill_form(app, &mut lines, &mut form).await? {
        let Some(path) = form.photo_path.as_deref() else {
            app.presenter().notice("Error: Please select an image");
            continue;
        };
        let photo = match load_photo(path) {
            Ok(photo) => photo,
            Err(error) => {
                app.presenter().notice(&format!("Error: {error}"));
                continue;
            }
        };

        if app.save(&form.draft, &photo).await.is_success() {
            saved += 1;
            form = Form {
                draft: MealDraft::blank(clock.local()),
                photo_path: None,
            };
        }
    }

    app.presenter()
        .notice(&format!("Session ended; {saved} entries saved."));
    Ok(saved)
}

/// Prompt for every field. Returns `false` when the session should end.
async fn fill_form<R, W>(
    app: &App<W>,
    lines: &mut Lines<R>,
    form: &mut Form,
) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let presenter = app.presenter();

    presenter.field_prompt("Name (or quit)", &form.draft.name);
    let Some(name) = lines.next_line().await? else {
        return Ok(false);
    };
    if name.trim() == QUIT {
        return Ok(false);
    }
    keep_or_replace(&mut form.draft.name, &name);

    let label = if form.draft.description.is_empty() {
        "Description"
    } else {
        "Description (- to clear)"
    };
    presenter.field_prompt(label, &form.draft.description);
    let Some(description) = lines.next_line().await? else {
        return Ok(false);
    };
    if description.trim() == CLEAR {
        form.draft.description.clear();
    } else {
        keep_or_replace(&mut form.draft.description, &description);
    }

    loop {
        presenter.field_prompt("Meal time", &format_meal_time_input(form.draft.meal_time));
        let Some(raw) = lines.next_line().await? else {
            return Ok(false);
        };
        if raw.trim().is_empty() {
            break;
        }
        match parse_meal_time(&raw) {
            Ok(meal_time) => {
                form.draft.meal_time = meal_time;
                break;
            }
            Err(error) => presenter.notice(&format!("Error: {error}")),
        }
    }

    let current = form
        .photo_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    presenter.field_prompt("Photo path", &current);
    let Some(photo) = lines.next_line().await? else {
        return Ok(false);
    };
    if !photo.trim().is_empty() {
        form.photo_path = Some(PathBuf::from(photo.trim()));
    }
    Ok(true)
}

fn keep_or_replace(field: &mut String, input: &str) {
    let trimmed = input.trim();
    if !trimmed.is_empty() {
        *field = trimmed.to_owned();
    }
}

#[cfg(test)]
mod tests {
    //! Session rounds against mocked ports and scripted input.

    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::ports::{
        AppendRowRequest, AppendedRange, MockConsentFlow, MockPhotoStore, MockSheetLog,
        SheetLogError, StoredPhoto,
    };
    use crate::domain::{
        Authorizer, DEFAULT_SHEET_RANGE, SubmissionPorts, SubmissionSequencer, SubmissionTarget,
    };
    use crate::inbound::cli::TerminalPresenter;
    use crate::test_support::{MutableClock, hour_long_credential};

    struct Harness {
        app: App<Vec<u8>>,
        presenter: Arc<TerminalPresenter<Vec<u8>>>,
        clock: Arc<MutableClock>,
        photo_dir: tempfile::TempDir,
    }

    impl Harness {
        fn new(sheet_log: MockSheetLog, uploads: usize) -> Self {
            let clock = Arc::new(MutableClock::new_year_breakfast());
            let mut consent = MockConsentFlow::new();
            consent
                .expect_request_token()
                .times(1)
                .returning(|_| Ok(hour_long_credential("ya29.session")));
            let authorizer = Arc::new(Authorizer::new(Arc::new(consent), clock.clone(), "client"));
            let mut photo_store = MockPhotoStore::new();
            photo_store.expect_upload().times(uploads).returning(|_, _| {
                Ok(StoredPhoto {
                    remote_id: "abc123".to_owned(),
                })
            });
            let sequencer = SubmissionSequencer::new(
                authorizer.clone(),
                SubmissionPorts {
                    photo_store: Arc::new(photo_store),
                    sheet_log: Arc::new(sheet_log),
                },
                clock.clone(),
                SubmissionTarget {
                    folder_id: "folder".to_owned(),
                    spreadsheet_id: "sheet".to_owned(),
                    sheet_range: DEFAULT_SHEET_RANGE.to_owned(),
                },
            );
            let presenter = Arc::new(TerminalPresenter::new(Vec::new()));
            let photo_dir = tempfile::tempdir().expect("temp dir");
            std::fs::write(photo_dir.path().join("oatmeal.jpg"), [0xFF, 0xD8])
                .expect("photo written");
            Self {
                app: App::new(authorizer, sequencer, presenter.clone()),
                presenter,
                clock,
                photo_dir,
            }
        }

        fn photo(&self) -> String {
            self.photo_dir
                .path()
                .join("oatmeal.jpg")
                .display()
                .to_string()
        }

        async fn run(&mut self, script: &str) -> usize {
            let clock = self.clock.clone();
            run_session(&mut self.app, script.as_bytes(), clock.as_ref())
                .await
                .expect("scripted input never fails")
        }

        fn output(self) -> String {
            drop(self.app);
            let presenter = Arc::into_inner(self.presenter).expect("sole presenter owner");
            String::from_utf8(presenter.into_inner()).expect("utf-8 output")
        }
    }

    fn recording_sheet_log(rows: Arc<Mutex<Vec<AppendRowRequest>>>) -> MockSheetLog {
        let mut sheet_log = MockSheetLog::new();
        sheet_log.expect_append_row().returning(move |_, request| {
            rows.lock().expect("rows lock").push(request.clone());
            Ok(AppendedRange::default())
        });
        sheet_log
    }

    #[tokio::test]
    async fn saves_entries_until_input_ends() {
        let rows = Arc::new(Mutex::new(Vec::new()));
        let mut harness = Harness::new(recording_sheet_log(rows.clone()), 2);
        let photo = harness.photo();
        let script = format!(
            "Oatmeal\n\n2024-01-01T07:30\n{photo}\nToast\nwith jam\n\n{photo}\n"
        );

        let saved = harness.run(&script).await;

        assert_eq!(saved, 2);
        let rows = rows.lock().expect("rows lock");
        assert_eq!(rows[0].values[1..4], ["Oatmeal", "", "1/1/2024, 7:30:00 AM"]);
        assert_eq!(rows[1].values[1..3], ["Toast", "with jam"]);
        drop(rows);
        assert!(harness.output().contains("Session ended; 2 entries saved."));
    }

    #[tokio::test]
    async fn failed_entry_is_kept_for_resubmission() {
        let mut sheet_log = MockSheetLog::new();
        let mut seq = mockall::Sequence::new();
        sheet_log
            .expect_append_row()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(SheetLogError::rejected("status 503")));
        sheet_log
            .expect_append_row()
            .withf(|_, request| request.values[1] == "Oatmeal")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(AppendedRange::default()));
        let mut harness = Harness::new(sheet_log, 2);
        let photo = harness.photo();
        let script = format!("Oatmeal\n\n\n{photo}\n\n\n\n\nquit\n");

        let saved = harness.run(&script).await;

        assert_eq!(saved, 1);
        let output = harness.output();
        assert!(output.contains("Error: sheet append rejected: status 503"));
        assert!(output.contains("Name (or quit) [Oatmeal]: "));
        assert!(output.contains("Food entry added successfully!"));
    }

    #[tokio::test]
    async fn dash_clears_a_kept_description() {
        let mut sheet_log = MockSheetLog::new();
        let mut seq = mockall::Sequence::new();
        sheet_log
            .expect_append_row()
            .withf(|_, request| request.values[2] == "with jam")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(SheetLogError::rejected("status 503")));
        sheet_log
            .expect_append_row()
            .withf(|_, request| request.values[1] == "Toast" && request.values[2].is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(AppendedRange::default()));
        let mut harness = Harness::new(sheet_log, 2);
        let photo = harness.photo();
        let script = format!("Toast
with jam

{photo}

-


");

        let saved = harness.run(&script).await;

        assert_eq!(saved, 1);
        assert!(
            harness
                .output()
                .contains("Description (- to clear) [with jam]: ")
        );
    }

    #[test]
    fn blank_input_keeps_the_field() {
        let mut field = "Oatmeal".to_owned();

        keep_or_replace(&mut field, "   ");
        assert_eq!(field, "Oatmeal");

        keep_or_replace(&mut field, "  Toast ");
        assert_eq!(field, "Toast");
    }

    #[tokio::test]
    async fn missing_photo_is_reported_without_network_calls() {
        let mut sheet_log = MockSheetLog::new();
        sheet_log.expect_append_row().never();
        let mut harness = Harness::new(sheet_log, 0);

        let saved = harness.run("Oatmeal\n\n\n\n").await;

        assert_eq!(saved, 0);
        assert!(harness.output().contains("Error: Please select an image"));
    }

    #[tokio::test]
    async fn malformed_meal_time_is_asked_again() {
        let rows = Arc::new(Mutex::new(Vec::new()));
        let mut harness = Harness::new(recording_sheet_log(rows.clone()), 1);
        let photo = harness.photo();
        let script = format!("Oatmeal\n\nnoon\n2024-01-01T12:15\n{photo}\n");

        let saved = harness.run(&script).await;

        assert_eq!(saved, 1);
        assert_eq!(
            rows.lock().expect("rows lock")[0].values[3],
            "1/1/2024, 12:15:00 PM"
        );
        assert!(
            harness
                .output()
                .contains("Error: Meal time 'noon' must look like 2024-01-01T08:00")
        );
    }
}
