use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;

use bombhunt_core::Side;
use bombhunt_protocol::{Briefing, ChatRequest, Debrief, TranscriptEntry};

use crate::{ChatService, Epoch, Inbox, StoryService};

enum Job {
    Briefing {
        epoch: Epoch,
    },
    Debrief {
        epoch: Epoch,
        briefing: String,
        player_won: bool,
    },
    Chat {
        epoch: Epoch,
        request: ChatRequest,
    },
}

/// Owns the narrative worker thread and the mailboxes its results land in.
///
/// Requests are tagged with the epoch that was live when they were made;
/// `begin_match` bumps the epoch, so completions belonging to an abandoned
/// match are discarded at the inbox. The interactive loop polls the inboxes
/// between frames and never blocks on a pending request.
pub struct NarrativeWorker {
    jobs: Option<mpsc::Sender<Job>>,
    epoch: AtomicU64,
    briefing_inbox: Inbox<Briefing>,
    debrief_inbox: Inbox<Debrief>,
    chat_inbox: Inbox<TranscriptEntry>,
    handle: Option<thread::JoinHandle<()>>,
}

impl NarrativeWorker {
    pub fn spawn(story: impl StoryService, chat: impl ChatService) -> Self {
        let (jobs, job_queue) = mpsc::channel::<Job>();
        let briefing_inbox = Inbox::new();
        let debrief_inbox = Inbox::new();
        let chat_inbox = Inbox::new();

        let handle = {
            let briefing_inbox = briefing_inbox.clone();
            let debrief_inbox = debrief_inbox.clone();
            let chat_inbox = chat_inbox.clone();
            thread::spawn(move || {
                // the loop ends when the handle drops its sender
                while let Ok(job) = job_queue.recv() {
                    match job {
                        Job::Briefing { epoch } => {
                            let briefing = story.briefing().unwrap_or_else(|err| {
                                log::warn!("briefing generation failed: {err:#}");
                                Briefing::fallback()
                            });
                            briefing_inbox.post(epoch, briefing);
                        }
                        Job::Debrief {
                            epoch,
                            briefing,
                            player_won,
                        } => {
                            let debrief =
                                story.debrief(&briefing, player_won).unwrap_or_else(|err| {
                                    log::warn!("debrief generation failed: {err:#}");
                                    Debrief::fallback(player_won)
                                });
                            debrief_inbox.post(epoch, debrief);
                        }
                        Job::Chat { epoch, request } => {
                            let text = chat.reply(&request).unwrap_or_else(|err| {
                                log::warn!("chat reply failed: {err:#}");
                                format!("Error: {err}")
                            });
                            chat_inbox.post(
                                epoch,
                                TranscriptEntry {
                                    speaker: Side::Opponent,
                                    text,
                                },
                            );
                        }
                    }
                }
            })
        };

        Self {
            jobs: Some(jobs),
            epoch: AtomicU64::new(0),
            briefing_inbox,
            debrief_inbox,
            chat_inbox,
            handle: Some(handle),
        }
    }

    pub fn epoch(&self) -> Epoch {
        Epoch(self.epoch.load(Ordering::SeqCst))
    }

    /// Starts a new match generation: pending completions for the previous
    /// match become stale and any already-delivered ones are dropped.
    pub fn begin_match(&self) -> Epoch {
        let next = Epoch(self.epoch.fetch_add(1, Ordering::SeqCst) + 1);
        self.briefing_inbox.clear();
        self.debrief_inbox.clear();
        self.chat_inbox.clear();
        next
    }

    pub fn request_briefing(&self) {
        self.submit(Job::Briefing {
            epoch: self.epoch(),
        });
    }

    pub fn request_debrief(&self, briefing: String, player_won: bool) {
        self.submit(Job::Debrief {
            epoch: self.epoch(),
            briefing,
            player_won,
        });
    }

    pub fn request_chat(&self, request: ChatRequest) {
        self.submit(Job::Chat {
            epoch: self.epoch(),
            request,
        });
    }

    pub fn poll_briefing(&self) -> Option<Briefing> {
        self.briefing_inbox.take(self.epoch())
    }

    pub fn poll_debrief(&self) -> Option<Debrief> {
        self.debrief_inbox.take(self.epoch())
    }

    pub fn poll_chat(&self) -> Option<TranscriptEntry> {
        self.chat_inbox.take(self.epoch())
    }

    fn submit(&self, job: Job) {
        if let Some(jobs) = &self.jobs
            && jobs.send(job).is_err()
        {
            log::error!("narrative worker is gone, request dropped");
        }
    }
}

impl Drop for NarrativeWorker {
    fn drop(&mut self) {
        // closing the channel lets the thread drain and exit
        self.jobs = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
