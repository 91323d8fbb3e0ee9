use crate::error::{JournalError, StoreError};
use crate::journal_entry::{day_of, JournalEntry, MoodRecord};
use crate::login::{attempt_login, Session};
use crate::policy::prepare_entry;
use crate::text_field::TextField;
use chrono::{DateTime, Duration, Local, Months, NaiveDate};
use std::collections::VecDeque;
use tracing::{info, warn};

/// A message the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Error(m) => m,
        }
    }
}

/// Which login field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFocus {
    #[default]
    ContractNumber,
    Password,
}

/// Everything the two screens show. Store calls run elsewhere; their
/// results come back through `finish_load` and `finish_save`.
pub struct JournalState {
    session: Session,
    pub contract_number: TextField,
    pub password: TextField,
    pub login_focus: LoginFocus,
    login_error: Option<String>,
    selected: DateTime<Local>,
    picker: Option<DateTime<Local>>,
    pub note: TextField,
    entries: Vec<MoodRecord>,
    loads_in_flight: usize,
    notices: VecDeque<Notice>,
}

impl JournalState {
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    pub fn starting_at(selected: DateTime<Local>) -> Self {
        JournalState {
            session: Session::LoggedOut,
            contract_number: TextField::new(),
            password: TextField::new(),
            login_focus: LoginFocus::default(),
            login_error: None,
            selected,
            picker: None,
            note: TextField::new(),
            entries: Vec::new(),
            loads_in_flight: 0,
            notices: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn get_entries(&self) -> &[MoodRecord] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    pub fn toggle_login_focus(&mut self) {
        self.login_focus = match self.login_focus {
            LoginFocus::ContractNumber => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::ContractNumber,
        };
    }

    /// Runs the login check on the current fields. Returns whether the
    /// session is now logged in.
    pub fn submit_login(&mut self) -> bool {
        if self.session.is_logged_in() {
            return true;
        }

        match attempt_login(self.contract_number.value(), self.password.value()) {
            Ok(owner_id) => {
                self.login_error = None;
                self.password.clear();
                self.session = Session::LoggedIn { owner_id };
                true
            }
            Err(e) => {
                self.login_error = Some(e.to_string());
                false
            }
        }
    }

    /// Day that a save would be filed under.
    pub fn selected_day(&self) -> NaiveDate {
        day_of(&self.selected)
    }

    pub fn picker_day(&self) -> Option<NaiveDate> {
        self.picker.as_ref().map(day_of)
    }

    pub fn is_picking_date(&self) -> bool {
        self.picker.is_some()
    }

    pub fn open_picker(&mut self) {
        self.picker = Some(self.selected);
    }

    pub fn shift_days(&mut self, days: i64) {
        if let Some(ref mut pending) = self.picker {
            if let Some(moved) = pending.checked_add_signed(Duration::days(days)) {
                *pending = moved;
            }
        }
    }

    pub fn shift_months(&mut self, months: i32) {
        if let Some(ref mut pending) = self.picker {
            let step = Months::new(months.unsigned_abs());
            let moved = if months >= 0 {
                pending.checked_add_months(step)
            } else {
                pending.checked_sub_months(step)
            };
            if let Some(moved) = moved {
                *pending = moved;
            }
        }
    }

    pub fn picker_today(&mut self) {
        if self.picker.is_some() {
            self.picker = Some(Local::now());
        }
    }

    pub fn confirm_picker(&mut self) {
        if let Some(pending) = self.picker.take() {
            self.selected = pending;
        }
    }

    pub fn cancel_picker(&mut self) {
        self.picker = None;
    }

    /// Marks a history load as started.
    pub fn begin_load(&mut self) {
        self.loads_in_flight += 1;
    }

    /// Takes the result of a history load. Rows replace the list; on
    /// failure the previous list stays.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<MoodRecord>, StoreError>,
    ) -> Result<(), JournalError> {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);

        match result {
            Ok(rows) => {
                info!(count = rows.len(), "mood history loaded");
                self.entries = rows;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "loading mood history failed");
                self.notices
                    .push_back(Notice::Error(format!("Error loading mood history: {e}")));
                Err(e.into())
            }
        }
    }

    /// Validates the current note and builds the entry to insert.
    ///
    /// A rejected note is reported as a notice and must not reach the
    /// store.
    pub fn begin_save(&mut self) -> Result<JournalEntry, JournalError> {
        let prepared = self
            .session
            .owner_id()
            .ok_or(JournalError::NotLoggedIn)
            .and_then(|owner_id| prepare_entry(self.note.value(), self.selected_day(), owner_id));

        if let Err(ref e) = prepared {
            info!(reason = ?e, "save rejected");
            self.notices.push_back(Notice::Error(e.to_string()));
        }
        prepared
    }

    /// Takes the result of an insert. On success the note is cleared and
    /// the caller reloads the history; a failed insert leaves the note and
    /// the list as they were.
    pub fn finish_save(&mut self, result: Result<(), StoreError>) -> Result<(), JournalError> {
        if let Err(e) = result {
            warn!(error = %e, "saving mood failed");
            self.notices
                .push_back(Notice::Error(format!("Error saving mood: {e}")));
            return Err(e.into());
        }

        info!("mood saved");
        self.notices.push_back(Notice::Info("Mood saved!".to_string()));
        self.note.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodCategory;
    use crate::journal_entry::RecordId;
    use chrono::TimeZone;

    fn typed(text: &str) -> TextField {
        TextField::from(text)
    }

    fn logged_in() -> JournalState {
        let noon = Local.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let mut state = JournalState::starting_at(noon);
        state.contract_number = typed("RE-71904/24");
        state.password = typed("abcdef");
        assert!(state.submit_login());
        state
    }

    #[test]
    fn login_failure_is_shown_inline() {
        let mut state = JournalState::new();
        state.contract_number = typed("RE-7190/24");
        state.password = typed("abcdef");
        assert!(!state.submit_login());
        assert_eq!(
            state.login_error(),
            Some("Contract number must look like RE-71904/24")
        );

        state.contract_number = typed("RE-71904/24");
        state.password = typed("abc");
        assert!(!state.submit_login());
        assert_eq!(
            state.login_error(),
            Some("Password must be at least 6 characters.")
        );
        assert_eq!(state.session(), &Session::LoggedOut);
    }

    #[test]
    fn login_success_sets_owner_and_clears_error() {
        let state = logged_in();
        assert_eq!(state.session().owner_id(), Some("RE-71904/24"));
        assert_eq!(state.login_error(), None);
        assert!(state.password.is_empty());
    }

    fn stored(note: &str, sentiment: &str) -> MoodRecord {
        MoodRecord {
            id: RecordId::Number(1),
            dt: "2024-07-15".to_string(),
            note: note.to_string(),
            sentiment: sentiment.to_string(),
            user_id: "RE-71904/24".to_string(),
        }
    }

    #[test]
    fn blank_note_is_rejected_before_any_insert() {
        let mut state = logged_in();
        state.note = typed("   ");

        assert_eq!(state.begin_save(), Err(JournalError::EmptyNote));
        assert_eq!(
            state.notice().map(Notice::message),
            Some("Please write something before saving your mood.")
        );
    }

    #[test]
    fn ambiguous_note_is_rejected_and_kept() {
        let mut state = logged_in();
        state.note = typed("I feel anxious and also a bit excited today");

        assert_eq!(
            state.begin_save(),
            Err(JournalError::AmbiguousMood(vec![
                MoodCategory::Excited,
                MoodCategory::Anxious
            ]))
        );
        assert_eq!(state.note.value(), "I feel anxious and also a bit excited today");
        let notice = state.notice().unwrap().message();
        assert!(notice.contains("excited, anxious"), "{notice}");
    }

    #[test]
    fn single_mood_entry_is_built_for_the_selected_day() {
        let mut state = logged_in();
        state.note = typed("I feel calm and at ease");

        let entry = state.begin_save().unwrap();
        assert_eq!(entry.sentiment, MoodCategory::Calm);
        assert_eq!(entry.date, state.selected_day());
        assert_eq!(entry.owner_id, "RE-71904/24");
        assert_eq!(state.notice(), None);
    }

    #[test]
    fn moodless_note_is_neutral() {
        let mut state = logged_in();
        state.note = typed("went to the shop");
        assert_eq!(state.begin_save().unwrap().sentiment, MoodCategory::Neutral);
    }

    #[test]
    fn successful_insert_clears_the_note() {
        let mut state = logged_in();
        state.note = typed("I feel calm and at ease");
        state.begin_save().unwrap();

        assert_eq!(state.finish_save(Ok(())), Ok(()));
        assert!(state.note.is_empty());
        assert_eq!(state.notice(), Some(&Notice::Info("Mood saved!".to_string())));
    }

    #[test]
    fn store_failure_leaves_note_and_list_alone() {
        let mut state = logged_in();
        state.begin_load();
        state.finish_load(Ok(vec![stored("so thankful", "grateful")])).unwrap();

        state.note = typed("feeling tired");
        state.begin_save().unwrap();
        let result = state.finish_save(Err(StoreError("JWT expired".into())));

        assert_eq!(result, Err(JournalError::Store(StoreError("JWT expired".into()))));
        assert_eq!(state.note.value(), "feeling tired");
        assert_eq!(state.get_entries().len(), 1);
        assert_eq!(
            state.notice().map(Notice::message),
            Some("Error saving mood: JWT expired")
        );
    }

    #[test]
    fn failed_load_keeps_previous_rows() {
        let mut state = logged_in();
        state.begin_load();
        assert!(state.is_loading());
        state.finish_load(Ok(vec![stored("so thankful", "grateful")])).unwrap();
        assert!(!state.is_loading());

        state.begin_load();
        assert!(state
            .finish_load(Err(StoreError("connection refused".into())))
            .is_err());
        assert_eq!(state.get_entries().len(), 1);
        assert!(!state.is_loading());
        assert_eq!(
            state.notice().map(Notice::message),
            Some("Error loading mood history: connection refused")
        );
    }

    #[test]
    fn overlapping_loads_keep_the_indicator_until_the_last() {
        let mut state = logged_in();
        state.begin_load();
        state.begin_load();
        state.finish_load(Ok(Vec::new())).unwrap();
        assert!(state.is_loading());
        state.finish_load(Ok(Vec::new())).unwrap();
        assert!(!state.is_loading());
    }

    #[test]
    fn saving_requires_a_session() {
        let mut state = JournalState::new();
        state.note = typed("calm");
        assert_eq!(state.begin_save(), Err(JournalError::NotLoggedIn));
    }

    #[test]
    fn picker_changes_date_only_when_confirmed() {
        let mut state = logged_in();
        let start = state.selected_day();

        state.open_picker();
        state.shift_days(-1);
        state.cancel_picker();
        assert_eq!(state.selected_day(), start);

        state.open_picker();
        state.shift_days(2);
        state.shift_months(-1);
        assert!(state.is_picking_date());
        state.confirm_picker();
        assert!(!state.is_picking_date());
        assert_eq!(
            state.selected_day(),
            (start + Duration::days(2)).checked_sub_months(Months::new(1)).unwrap()
        );
    }
}
