use crate::tui::session::UiPrefs;
use crate::tui::theme::Theme;
use frame_lens_common::Config;
use frame_lens_core::{
    build_scatter, Dataset, ExplorerSession, NavAction, PageOutput, PredicateKey,
    PredicateUpdate, ScatterFigure, ScatterSpec,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Filters,
    Columns,
    Table,
}

/// Which value the bottom-line prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Field,
    Literal,
    Goto,
    PageSize,
}

impl InputMode {
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::Field => "field",
            InputMode::Literal => "value",
            InputMode::Goto => "go to page",
            InputMode::PageSize => "page size",
        }
    }
}

pub struct App {
    pub input_path: String,
    pub session: ExplorerSession,
    pub config: Config,
    pub theme: Theme,
    pub focus: Focus,
    pub filter_selected: usize,
    pub column_selected: usize,
    pub input: Option<InputMode>,
    pub input_buffer: String,
    pub show_table: bool,
    pub show_figure: bool,
    pub show_help: bool,
    pub figure_spec: ScatterSpec,
    pub figure: Option<ScatterFigure>,
    pub status_msg: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        input_path: String,
        dataset: Arc<Dataset>,
        config: Config,
        page_size: i64,
    ) -> anyhow::Result<Self> {
        let mut session = ExplorerSession::new(dataset, page_size)?;
        if let Some(cols) = &config.display.default_columns {
            session.select_columns(cols.clone());
        }
        Ok(Self {
            input_path,
            session,
            theme: Theme::from_name(&config.display.theme),
            figure_spec: ScatterSpec::from(&config.figure),
            config,
            focus: Focus::Filters,
            filter_selected: 0,
            column_selected: 0,
            input: None,
            input_buffer: String::new(),
            show_table: true,
            show_figure: false,
            show_help: false,
            figure: None,
            status_msg: String::from("Ready | a:add filter ?:help q:quit"),
            should_quit: false,
        })
    }

    pub fn restore_from_prefs(&mut self, prefs: &UiPrefs) {
        if let Ok(size) = i64::try_from(prefs.page_size) {
            if let Err(e) = self.session.set_page_size(size) {
                tracing::warn!(%e, "ignoring remembered page size");
            }
        }
        if !prefs.columns.is_empty() {
            self.session.select_columns(prefs.columns.clone());
        }
        self.show_table = prefs.show_table;
        self.show_figure = prefs.show_figure;
        self.refresh_figure();
    }

    pub fn to_prefs(&self) -> UiPrefs {
        UiPrefs {
            input_path: self.input_path.clone(),
            page_size: self.session.page_state().page_size(),
            columns: self.session.selection().to_vec(),
            show_table: self.show_table,
            show_figure: self.show_figure,
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Filters => Focus::Columns,
            Focus::Columns if self.show_table => Focus::Table,
            Focus::Columns | Focus::Table => Focus::Filters,
        };
    }

    pub fn column_names(&self) -> Vec<String> {
        self.session.dataset().column_names()
    }

    pub fn page(&self) -> PageOutput {
        self.session.current_page()
    }

    pub fn selected_key(&self) -> Option<PredicateKey> {
        self.session.predicates().keys().get(self.filter_selected).copied()
    }

    pub fn filter_down(&mut self) {
        let len = self.session.predicates().len();
        if self.filter_selected + 1 < len {
            self.filter_selected += 1;
        }
    }

    pub fn filter_up(&mut self) {
        self.filter_selected = self.filter_selected.saturating_sub(1);
    }

    pub fn column_down(&mut self) {
        if self.column_selected + 1 < self.session.dataset().num_columns() {
            self.column_selected += 1;
        }
    }

    pub fn column_up(&mut self) {
        self.column_selected = self.column_selected.saturating_sub(1);
    }

    pub fn add_filter(&mut self) {
        match self.session.add_predicate() {
            Ok(_) => {
                self.filter_selected = self.session.predicates().len().saturating_sub(1);
                self.after_filter_change();
            }
            Err(e) => self.status_msg = format!("add filter failed: {e}"),
        }
    }

    pub fn remove_filter(&mut self) {
        let Some(key) = self.selected_key() else { return };
        match self.session.remove_predicate(key) {
            Ok(_) => {
                let len = self.session.predicates().len();
                self.filter_selected = self.filter_selected.min(len.saturating_sub(1));
                self.after_filter_change();
            }
            Err(e) => self.status_msg = format!("remove filter failed: {e}"),
        }
    }

    fn update_selected(&mut self, update: PredicateUpdate) {
        let Some(key) = self.selected_key() else {
            self.status_msg = "no filter selected (a to add)".into();
            return;
        };
        match self.session.update_predicate(key, update) {
            Ok(_) => self.after_filter_change(),
            Err(e) => self.status_msg = format!("filter update failed: {e}"),
        }
    }

    /// Steps the selected filter's field through the dataset columns.
    pub fn cycle_field(&mut self, forward: bool) {
        let Some(key) = self.selected_key() else { return };
        let names = self.column_names();
        if names.is_empty() {
            return;
        }
        let current = self
            .session
            .predicates()
            .get(key)
            .and_then(|p| p.field.as_deref())
            .and_then(|f| names.iter().position(|n| n == f));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => names.len() - 1,
            (Some(i), true) => (i + 1) % names.len(),
            (Some(i), false) => (i + names.len() - 1) % names.len(),
        };
        self.update_selected(PredicateUpdate::Field(Some(names[next].clone())));
    }

    pub fn cycle_operator(&mut self) {
        let Some(key) = self.selected_key() else { return };
        let next = self
            .session
            .predicates()
            .get(key)
            .and_then(|p| p.operator)
            .map_or(frame_lens_core::Operator::Eq, |op| op.next());
        self.update_selected(PredicateUpdate::Operator(Some(next)));
    }

    pub fn begin_input(&mut self, mode: InputMode) {
        let current = self
            .selected_key()
            .and_then(|k| self.session.predicates().get(k).cloned());
        self.input_buffer = match mode {
            InputMode::Field => current.and_then(|p| p.field).unwrap_or_default(),
            InputMode::Literal => current.and_then(|p| p.literal).unwrap_or_default(),
            InputMode::Goto => String::new(),
            InputMode::PageSize => self.session.page_state().page_size().to_string(),
        };
        if matches!(mode, InputMode::Field | InputMode::Literal) && self.selected_key().is_none() {
            self.status_msg = "no filter selected (a to add)".into();
            return;
        }
        self.input = Some(mode);
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
        self.input_buffer.clear();
    }

    pub fn commit_input(&mut self) {
        let Some(mode) = self.input.take() else { return };
        let raw = std::mem::take(&mut self.input_buffer);
        let value = raw.trim();
        match mode {
            InputMode::Field => {
                let field = (!value.is_empty()).then(|| value.to_string());
                self.update_selected(PredicateUpdate::Field(field));
            }
            InputMode::Literal => {
                let literal = (!value.is_empty()).then(|| value.to_string());
                self.update_selected(PredicateUpdate::Literal(literal));
            }
            InputMode::Goto => match value.parse::<i64>() {
                // pages are shown 1-based
                Ok(n) => self.navigate(NavAction::Goto(n.saturating_sub(1))),
                Err(_) => self.status_msg = format!("not a page number: {value}"),
            },
            InputMode::PageSize => match value.parse::<i64>() {
                Ok(n) => self.set_page_size(n),
                Err(_) => self.status_msg = format!("not a page size: {value}"),
            },
        }
    }

    pub fn navigate(&mut self, action: NavAction) {
        let index = self.session.navigate(action);
        self.status_msg = format!("page {} of {}", index + 1, self.session.page_count());
    }

    pub fn set_page_size(&mut self, size: i64) {
        match self.session.set_page_size(size) {
            Ok(()) => {
                self.status_msg = format!(
                    "page size {} | {} pages",
                    self.session.page_state().page_size(),
                    self.session.page_count()
                )
            }
            Err(e) => self.status_msg = e.to_string(),
        }
    }

    pub fn step_page_size(&mut self, delta: i64) {
        let current = self.session.page_state().page_size() as i64;
        self.set_page_size(current.saturating_add(delta).max(1));
    }

    /// Adds or removes the column under the cursor from the table selection.
    pub fn toggle_column(&mut self) {
        let names = self.column_names();
        let Some(name) = names.get(self.column_selected) else { return };
        let mut selection = self.session.selection().to_vec();
        if let Some(pos) = selection.iter().position(|c| c == name) {
            selection.remove(pos);
        } else {
            selection.push(name.clone());
        }
        self.session.select_columns(selection);
    }

    pub fn toggle_table(&mut self) {
        self.show_table = !self.show_table;
        if !self.show_table && self.focus == Focus::Table {
            self.focus = Focus::Filters;
        }
    }

    pub fn toggle_figure(&mut self) {
        self.show_figure = !self.show_figure;
        self.refresh_figure();
    }

    /// The figure is only computed while it is shown.
    pub fn refresh_figure(&mut self) {
        if !self.show_figure {
            self.figure = None;
            return;
        }
        match build_scatter(self.session.filtered(), &self.figure_spec) {
            Ok(fig) => self.figure = Some(fig),
            Err(e) => {
                self.figure = None;
                self.status_msg = format!("figure: {e}");
            }
        }
    }

    fn after_filter_change(&mut self) {
        self.refresh_figure();
        let view = self.session.filtered();
        let mut msg = format!(
            "{} of {} rows",
            view.num_rows(),
            self.session.dataset().num_rows()
        );
        if let Some(d) = self.session.diagnostics().first() {
            msg.push_str(&format!(" | filter {} ignored: {}", d.key, d.error));
        }
        self.status_msg = msg;
    }
}
