//! Three-step registration flow: school, participants, review.
//!
//! Moving forward validates only the fields of the step being left; moving
//! back never validates. `finish` runs the full rule set.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Participant, Registration, SchoolInfo};
use crate::sound::SoundEffects;
use crate::validation::{self, FieldError, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    School,
    Participants,
    Review,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Step::School => 1,
            Step::Participants => 2,
            Step::Review => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::School => "Datos de la Escuela",
            Step::Participants => "Participantes",
            Step::Review => "Confirmación",
        }
    }

    fn next(&self) -> Option<Step> {
        match self {
            Step::School => Some(Step::Participants),
            Step::Participants => Some(Step::Review),
            Step::Review => None,
        }
    }

    fn previous(&self) -> Option<Step> {
        match self {
            Step::School => None,
            Step::Participants => Some(Step::School),
            Step::Review => Some(Step::Participants),
        }
    }
}

pub struct RegistrationWizard {
    sounds: Arc<dyn SoundEffects>,
    today: NaiveDate,
    step: Step,
    completed: Vec<Step>,
    draft: Registration,
}

impl RegistrationWizard {
    pub fn new(sounds: Arc<dyn SoundEffects>, today: NaiveDate) -> Self {
        Self::with_draft(sounds, today, Registration::default())
    }

    /// Start from an already filled-in draft, e.g. one loaded from a file.
    pub fn with_draft(sounds: Arc<dyn SoundEffects>, today: NaiveDate, draft: Registration) -> Self {
        Self {
            sounds,
            today,
            step: Step::School,
            completed: Vec::new(),
            draft,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_completed(&self, step: Step) -> bool {
        self.completed.contains(&step)
    }

    pub fn draft(&self) -> &Registration {
        &self.draft
    }

    pub fn set_school(&mut self, school: SchoolInfo) {
        self.draft.school = school;
    }

    pub fn school_mut(&mut self) -> &mut SchoolInfo {
        &mut self.draft.school
    }

    pub fn add_participant(&mut self, participant: Participant) -> usize {
        self.draft.participants.push(participant);
        self.draft.participants.len()
    }

    pub fn remove_participant(&mut self, index: usize) -> Option<Participant> {
        if index < self.draft.participants.len() {
            Some(self.draft.participants.remove(index))
        } else {
            None
        }
    }

    fn step_errors(&self, step: Step) -> Vec<FieldError> {
        match step {
            Step::School => validation::validate_school(&self.draft.school),
            Step::Participants => validation::validate_participants(&self.draft.participants, self.today),
            Step::Review => Vec::new(),
        }
    }

    fn mark_completed(&mut self, step: Step) {
        if !self.completed.contains(&step) {
            self.completed.push(step);
        }
    }

    /// Validate the current step and advance. Stays put on the last step.
    pub fn next(&mut self) -> Result<Step, ValidationErrors> {
        let Some(next) = self.step.next() else {
            return Ok(self.step);
        };
        ValidationErrors::into_result(self.step_errors(self.step))?;
        self.mark_completed(self.step);
        self.sounds.success();
        debug!(from = self.step.number(), to = next.number(), "Wizard step advanced");
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> Step {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Validate everything and hand over the finished registration.
    pub fn finish(mut self) -> Result<Registration, ValidationErrors> {
        validation::validate_registration(&self.draft, self.today)?;
        self.mark_completed(Step::Review);
        self.sounds.success();
        Ok(self.draft)
    }
}
