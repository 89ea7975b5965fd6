use crate::core::config::json::JsonConfig;
use crate::errors::MyError;
use crate::util::{MESSAGE_LIMIT, enums::AudioStruct};
use bytes::Bytes;
use log::{debug, error, info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, ReplyParameters};
use url::Url;

pub const TRANSCRIPT_FILE_NAME: &str = "transcript.txt";
const MAX_ATTEMPTS: u32 = 3;

pub const EMPTY_TRANSCRIPT_TEXT: &str = "Sorry, I could not transcribe that audio.";

#[derive(Debug, PartialEq, Eq)]
pub enum TranscriptReply {
    Empty,
    Text(String),
    Document(Vec<u8>),
}

pub fn shape_transcript(transcript: &str, limit: usize) -> TranscriptReply {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        TranscriptReply::Empty
    } else if transcript.chars().count() > limit {
        TranscriptReply::Document(transcript.as_bytes().to_vec())
    } else {
        TranscriptReply::Text(transcript.to_string())
    }
}

#[derive(Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
}

/// Minimal client for the Whisper `audio/transcriptions` endpoint.
#[derive(Clone)]
pub struct WhisperClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
}

impl WhisperClient {
    pub fn new(api_key: &str, settings: &JsonConfig) -> Result<Self, MyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        // Fail at startup rather than on the first voice message.
        let base_url = Url::parse(settings.get_whisper_base_url())?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            model: settings.get_whisper_model().to_string(),
            language: settings.get_whisper_language().to_string(),
        })
    }

    pub async fn transcribe(&self, audio: &AudioStruct, data: Bytes) -> Result<String, MyError> {
        let mut last_error = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match self.request(audio, data.clone()).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    error!("Transcription error (attempt {}): {:?}", attempt, e);
                    last_error = e.to_string();
                }
            }
        }
        Err(MyError::Transcription(last_error))
    }

    async fn request(&self, audio: &AudioStruct, data: Bytes) -> Result<String, MyError> {
        let part = Part::bytes(data.to_vec())
            .file_name(audio.file_name.clone())
            .mime_str(&audio.mime_type)?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .part("file", part);

        let response: WhisperResponse = self
            .http
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.text)
    }
}

pub fn get_audio(msg: &Message) -> Option<AudioStruct> {
    if let Some(voice) = msg.voice() {
        return Some(AudioStruct {
            mime_type: voice
                .mime_type
                .as_ref()
                .map_or("audio/ogg".to_string(), |m| m.essence_str().to_owned()),
            file_id: voice.file.id.0.clone(),
            file_name: "voice.ogg".to_string(),
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(AudioStruct {
            mime_type: audio
                .mime_type
                .as_ref()
                .map_or("audio/mpeg".to_string(), |m| m.essence_str().to_owned()),
            file_id: audio.file.id.0.clone(),
            file_name: audio
                .file_name
                .clone()
                .unwrap_or_else(|| "audio.mp3".to_string()),
        });
    }
    None
}

pub async fn save_file_to_memory(bot: &Bot, file_id: &str) -> Result<Bytes, MyError> {
    let file = bot.get_file(FileId(file_id.to_string())).await?;
    let mut data = Vec::new();
    bot.download_file(&file.path, &mut data).await?;
    Ok(Bytes::from(data))
}

pub async fn transcription_handler(
    bot: Bot,
    msg: Message,
    client: &WhisperClient,
) -> Result<(), MyError> {
    let Some(audio) = get_audio(&msg) else {
        return Ok(());
    };

    let status = bot
        .send_message(msg.chat.id, "Processing audio...")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    let transcript = match save_file_to_memory(&bot, &audio.file_id).await {
        Ok(data) => {
            debug!("Downloaded {} bytes of {}", data.len(), audio.mime_type);
            client.transcribe(&audio, data).await
        }
        Err(e) => Err(e),
    };

    let transcript = match transcript {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to get transcription: {:?}", e);
            let error_text = match e {
                MyError::Reqwest(_) | MyError::Teloxide(_) | MyError::Io(_) => {
                    "❌ Could not download the file. It may be too large (>20MB)."
                }
                _ => "❌ The transcription service failed. Please try again later.",
            };
            bot.edit_message_text(status.chat.id, status.id, error_text)
                .await?;
            return Ok(());
        }
    };

    match shape_transcript(&transcript, MESSAGE_LIMIT) {
        TranscriptReply::Empty => {
            bot.edit_message_text(status.chat.id, status.id, EMPTY_TRANSCRIPT_TEXT)
                .await?;
        }
        TranscriptReply::Text(text) => {
            bot.edit_message_text(status.chat.id, status.id, text).await?;
        }
        TranscriptReply::Document(bytes) => {
            info!(
                "Transcript for chat {} is {} bytes, sending as document",
                msg.chat.id,
                bytes.len()
            );
            bot.delete_message(status.chat.id, status.id).await.ok();
            bot.send_document(
                msg.chat.id,
                InputFile::memory(bytes).file_name(TRANSCRIPT_FILE_NAME),
            )
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        }
    }
    Ok(())
}
