//! JSON request/response surface for the deck service.
//!
//! Requests and responses are internally tagged JSON objects:
//!
//! ```json
//! {"op": "move_slide", "slide": 7, "direction": "down"}
//! {"status": "ok", "slide": {...}, "deck": [...]}
//! {"status": "error", "code": "PERMISSION_DENIED", "message": "..."}
//! ```
//!
//! [`TransportAdapter`] decodes a request, dispatches it to a [`DeckService`]
//! and encodes the outcome. Every failure, malformed input included, is
//! reported as an error response rather than a Rust error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use deckstore_core::{DeckId, Direction, FieldMap, NewSlide, Slide, SlideId, TitleFields};
use deckstore_store::Store;

use crate::error::{DeckError, ErrorCode};
use crate::service::{DeckService, WriteOutcome};

/// A single call into the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    CreateDeck {
        deck: DeckId,
        title: TitleFields,
        #[serde(default)]
        items: Vec<NewSlide>,
    },
    ListSlides {
        deck: DeckId,
    },
    AppendChild {
        deck: DeckId,
        parent: SlideId,
    },
    UpdateFields {
        slide: SlideId,
        fields: FieldMap,
    },
    DeleteSlide {
        slide: SlideId,
    },
    MoveSlide {
        slide: SlideId,
        direction: Direction,
    },
}

/// The reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Slides {
        slides: Vec<Slide>,
    },
    Created {
        count: usize,
    },
    Ok {
        slide: Slide,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deck: Option<Vec<Slide>>,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<WriteOutcome> for Response {
    fn from(outcome: WriteOutcome) -> Self {
        Response::Ok {
            slide: outcome.slide,
            deck: outcome.deck,
        }
    }
}

impl From<DeckError> for Response {
    fn from(err: DeckError) -> Self {
        Response::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Something that answers requests.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: Request) -> Response;
}

/// Adapts a [`DeckService`] to the JSON transport.
pub struct TransportAdapter<S: Store> {
    service: DeckService<S>,
}

impl<S: Store> TransportAdapter<S> {
    pub fn new(service: DeckService<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &DeckService<S> {
        &self.service
    }

    /// Decode, dispatch and encode one request.
    pub async fn handle_json(&self, input: &str) -> String {
        let response = match serde_json::from_str::<Request>(input) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected undecodable request");
                Response::from(DeckError::Codec(e))
            }
        };

        encode(&response)
    }

    async fn dispatch(&self, request: Request) -> crate::Result<Response> {
        let response: Response = match request {
            Request::CreateDeck { deck, title, items } => Response::Created {
                count: self.service.create_deck(&deck, &title, &items).await?,
            },
            Request::ListSlides { deck } => Response::Slides {
                slides: self.service.list(&deck).await?,
            },
            Request::AppendChild { deck, parent } => {
                self.service.append_child(&deck, parent).await?.into()
            }
            Request::UpdateFields { slide, fields } => {
                self.service.update_fields(slide, &fields).await?.into()
            }
            Request::DeleteSlide { slide } => self.service.delete_slide(slide).await?.into(),
            Request::MoveSlide { slide, direction } => {
                self.service.move_slide(slide, direction).await?.into()
            }
        };
        Ok(response)
    }
}

#[async_trait]
impl<S: Store> RequestHandler for TransportAdapter<S> {
    async fn handle(&self, request: Request) -> Response {
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(code = ?e.code(), error = %e, "Request failed");
                e.into()
            }
        }
    }
}

fn encode(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode response");
        r#"{"status":"error","code":"INTERNAL","message":"response encoding failed"}"#.to_string()
    })
}
