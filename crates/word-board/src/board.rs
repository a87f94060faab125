//! Word board session

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action::{ActionOutcome, BoardAction};
use crate::service::WordService;
use crate::BoardError;

/// Number of word slots, one per screen section
pub const SLOT_COUNT: usize = 4;

/// A spoken sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub sentence: String,
    /// MP3 audio, `None` when speech synthesis failed
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
}

/// Observable board state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Words of the current page, slot order
    pub words: Vec<String>,
    pub selected_words: Vec<String>,
    /// 1-based page number
    pub current_page: usize,
    pub total_pages: usize,
    pub prev_page_words: Option<Vec<String>>,
    pub next_page_words: Option<Vec<String>>,
    pub last_sentence: Option<String>,
    pub status: String,
    /// A backend request is in flight; winks are ignored
    pub busy: bool,
}

/// Word board
///
/// A round starts with a fresh page of words (initial words or
/// recommendations for the last selection). Paging forward inside a round
/// asks for words not yet shown in it; paging back reuses fetched pages.
pub struct WordBoard<S> {
    service: S,
    pages: Vec<Vec<String>>,
    page_index: usize,
    selected: Vec<String>,
    /// Every word shown since the round started
    shown: Vec<String>,
    last_sentence: Option<String>,
    status: String,
}

impl<S: WordService> WordBoard<S> {
    /// Create an empty board; call [`WordBoard::load_initial`] to fill it
    pub fn new(service: S) -> Self {
        Self {
            service,
            pages: vec![Vec::new()],
            page_index: 0,
            selected: Vec::new(),
            shown: Vec::new(),
            last_sentence: None,
            status: "Loading words".to_string(),
        }
    }

    /// Start a round with the initial words
    pub async fn load_initial(&mut self) -> Result<(), BoardError> {
        match self.service.initial_words().await {
            Ok(words) => {
                self.start_round(words);
                self.status = "Look at a word, wink left to select".to_string();
                Ok(())
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Run the action bound to a wink. `section` is the gaze section at the time.
    pub async fn dispatch(
        &mut self,
        action: BoardAction,
        section: Option<u8>,
    ) -> Result<ActionOutcome, BoardError> {
        debug!("Dispatching {} (section {:?})", action.as_str(), section);
        match action {
            BoardAction::Select => {
                let Some(section) = section else {
                    return Err(self.fail(BoardError::NoSection));
                };
                let word = self.select_current(section).await?;
                Ok(ActionOutcome::Selected { word })
            }
            BoardAction::Speak => self.speak().await.map(ActionOutcome::Spoke),
        }
    }

    /// Select the word in `section` (1-4) and load words to follow it
    pub async fn select_current(&mut self, section: u8) -> Result<String, BoardError> {
        let word = match self.word_at(section).map(str::to_string) {
            Ok(word) => word,
            Err(e) => return Err(self.fail(e)),
        };
        let context = self.selected.clone();
        self.selected.push(word.clone());
        info!("Selected '{}' ({} words)", word, self.selected.len());

        match self.service.recommend(&word, &context).await {
            Ok(words) => {
                self.start_round(words);
                self.status = format!("Selected '{}'", word);
                Ok(word)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Generate a sentence from the selection and synthesize it.
    ///
    /// On success the selection is cleared and a new round starts with the
    /// initial words. A speech failure still returns the sentence.
    pub async fn speak(&mut self) -> Result<Utterance, BoardError> {
        if self.selected.is_empty() {
            return Err(self.fail(BoardError::NothingSelected));
        }

        let sentence = match self.service.generate(&self.selected).await {
            Ok(sentence) => sentence,
            Err(e) => return Err(self.fail(e.into())),
        };
        info!("Generated sentence from {} words", self.selected.len());

        let audio = match self.service.text_to_speech(&sentence).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("Speech synthesis failed, showing text only: {}", e);
                None
            }
        };

        self.selected.clear();
        self.last_sentence = Some(sentence.clone());

        if let Err(e) = self.load_initial().await {
            warn!("Failed to reload initial words: {}", e);
        } else {
            self.status = format!("Said: {}", sentence);
        }

        Ok(Utterance { sentence, audio })
    }

    /// Show the next page, fetching new words when past the last fetched page.
    ///
    /// Returns false when the backend has nothing new.
    pub async fn next_page(&mut self) -> Result<bool, BoardError> {
        if self.page_index + 1 < self.pages.len() {
            self.page_index += 1;
            return Ok(true);
        }

        let words = match self
            .service
            .recommend_diverse(&self.selected, &self.shown)
            .await
        {
            Ok(words) => words,
            Err(e) => return Err(self.fail(e.into())),
        };

        if words.is_empty() {
            debug!("No more words for this round");
            return Ok(false);
        }

        self.shown.extend(words.iter().cloned());
        self.pages.push(words);
        self.page_index = self.pages.len() - 1;
        debug!("Page {}/{}", self.page_index + 1, self.pages.len());
        Ok(true)
    }

    /// Show the previous page. Returns false on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }
        self.page_index -= 1;
        true
    }

    fn start_round(&mut self, words: Vec<String>) {
        if words.len() < SLOT_COUNT {
            warn!("Backend returned {} words for {} slots", words.len(), SLOT_COUNT);
        }
        self.shown = words.clone();
        self.pages = vec![words];
        self.page_index = 0;
    }

    fn fail(&mut self, err: BoardError) -> BoardError {
        warn!("Word board action failed: {}", err);
        self.status = err.user_message();
        err
    }

    fn word_at(&self, section: u8) -> Result<&str, BoardError> {
        if !(1..=SLOT_COUNT as u8).contains(&section) {
            return Err(BoardError::InvalidSection(section));
        }
        self.words()
            .get(usize::from(section) - 1)
            .map(String::as_str)
            .ok_or(BoardError::EmptySlot(section))
    }

    /// Words of the current page
    pub fn words(&self) -> &[String] {
        self.pages.get(self.page_index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selected_words(&self) -> &[String] {
        &self.selected
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            words: self.words().to_vec(),
            selected_words: self.selected.clone(),
            current_page: self.page_index + 1,
            total_pages: self.pages.len(),
            prev_page_words: self
                .page_index
                .checked_sub(1)
                .and_then(|i| self.pages.get(i))
                .cloned(),
            next_page_words: self.pages.get(self.page_index + 1).cloned(),
            last_sentence: self.last_sentence.clone(),
            status: self.status.clone(),
            busy: false,
        }
    }
}
