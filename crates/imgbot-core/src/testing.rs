//! Hand-written fakes for the ports, shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    credential::Credential,
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    host::{ImageFile, ImageHost, UploadAttempt, UploadResult},
    messaging::{
        port::{MediaSource, MessagingPort},
        types::ChatAction,
    },
    Result,
};

/// Scripted response for one `ImageHost::upload` call.
#[derive(Clone, Debug)]
pub enum Scripted {
    Uploaded(UploadResult),
    Unauthorized,
    Fail(String),
}

/// Issues `tok-1`, `tok-2`, ... and replays scripted upload responses.
/// Once the script runs out, uploads succeed with an empty result.
#[derive(Default)]
pub struct FakeHost {
    auth_fails: bool,
    auth_calls: AtomicUsize,
    script: Mutex<VecDeque<Scripted>>,
    uploads: Mutex<Vec<(String, ImageFile)>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_auth(mut self) -> Self {
        self.auth_fails = true;
        self
    }

    pub fn with_uploads(self, script: Vec<Scripted>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn upload_tokens(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(t, _)| t.clone())
            .collect()
    }

    pub fn uploaded_images(&self) -> Vec<ImageFile> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(_, i)| i.clone())
            .collect()
    }
}

#[async_trait]
impl ImageHost for FakeHost {
    async fn authenticate(&self) -> Result<Credential> {
        let n = self.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.auth_fails {
            return Err(Error::Auth("401 bad credentials".to_string()));
        }
        Ok(Credential::new(format!("tok-{n}")))
    }

    async fn upload(&self, image: &ImageFile, token: &Credential) -> Result<UploadAttempt> {
        self.uploads
            .lock()
            .unwrap()
            .push((token.as_str().to_string(), image.clone()));
        let next = self.script.lock().unwrap().pop_front();
        match next {
            None => Ok(UploadAttempt::Uploaded(UploadResult::default())),
            Some(Scripted::Uploaded(r)) => Ok(UploadAttempt::Uploaded(r)),
            Some(Scripted::Unauthorized) => Ok(UploadAttempt::Unauthorized),
            Some(Scripted::Fail(msg)) => Err(Error::Upload(msg)),
        }
    }
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sends: Mutex<Vec<String>>,
    actions: Mutex<Vec<ChatAction>>,
}

impl FakeMessenger {
    pub fn sent_html(&self) -> Vec<String> {
        self.sends.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<ChatAction> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.sends.lock().unwrap().push(html.to_string());
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(*id),
        })
    }

    async fn send_chat_action(&self, _chat_id: ChatId, action: ChatAction) -> Result<()> {
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}

pub struct FakeMedia {
    bytes: Vec<u8>,
    fetches: AtomicUsize,
    fail: AtomicBool,
}

impl FakeMedia {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            fetches: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for FakeMedia {
    async fn fetch(&self, _file_id: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(Error::External("telegram error: file is too big".to_string()));
        }
        Ok(self.bytes.clone())
    }
}
