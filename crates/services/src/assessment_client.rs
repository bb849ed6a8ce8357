use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_core::Clock;
use campus_core::model::{
    AnswerVector, AssessmentDefinition, AssessmentError, AssessmentId, Question, SubmissionReceipt,
};

use crate::config::AssessmentClientConfig;
use crate::error::AssessmentServiceError;

/// Remote source of assessment definitions and sink for answer vectors.
#[async_trait]
pub trait AssessmentService: Send + Sync {
    async fn fetch_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentDefinition, AssessmentServiceError>;

    /// Post the answers of one attempt. `attempt` is stable across retries of
    /// the same vector.
    async fn submit_answers(
        &self,
        id: &AssessmentId,
        attempt: Uuid,
        answers: &AnswerVector,
    ) -> Result<SubmissionReceipt, AssessmentServiceError>;
}

//
// ─── WIRE FORMAT ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentDto {
    title: String,
    duration_seconds: u32,
    questions: Vec<QuestionDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    #[serde(alias = "question")]
    text: String,
    options: Vec<String>,
    #[serde(default = "default_marks")]
    marks: f64,
    /// Only read so it can be reported and dropped.
    #[serde(default, alias = "correctAnswer", alias = "answer")]
    correct_option: Option<serde_json::Value>,
}

fn default_marks() -> f64 {
    1.0
}

impl AssessmentDto {
    fn leaked_answer_keys(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| question.correct_option.is_some())
            .count()
    }

    fn into_definition(self, id: AssessmentId) -> Result<AssessmentDefinition, AssessmentError> {
        let questions = self
            .questions
            .into_iter()
            .map(|question| Question::new(question.text, question.options, question.marks))
            .collect();
        AssessmentDefinition::new(id, self.title, self.duration_seconds, questions)
    }
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    answers: &'a AnswerVector,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    max_score: Option<f64>,
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

/// `AssessmentService` over the school REST API.
#[derive(Clone)]
pub struct HttpAssessmentService {
    client: Client,
    config: AssessmentClientConfig,
    clock: Clock,
}

impl HttpAssessmentService {
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::Http` if the HTTP client cannot be built.
    pub fn new(config: AssessmentClientConfig, clock: Clock) -> Result<Self, AssessmentServiceError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AssessmentClientConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.credentials.as_ref() {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    fn fetch_request(&self, id: &AssessmentId) -> RequestBuilder {
        let url = self.config.endpoint(&["assessments", id.as_str()]);
        debug!("fetching assessment {id} from {url}");
        self.authorize(self.client.get(url))
    }

    fn submit_request(
        &self,
        id: &AssessmentId,
        attempt: Uuid,
        answers: &AnswerVector,
    ) -> RequestBuilder {
        let url = self.config.endpoint(&["assessments", id.as_str(), "submit"]);
        debug!("submitting {} answers for assessment {id} to {url}", answers.len());
        let request = self
            .client
            .post(url)
            .header(IDEMPOTENCY_KEY, attempt.to_string())
            .json(&SubmitRequest { answers });
        self.authorize(request)
    }

    async fn read_body(response: Response) -> Result<String, AssessmentServiceError> {
        classify(response.status())?;
        Ok(response.text().await?)
    }
}

const IDEMPOTENCY_KEY: &str = "Idempotency-Key";

fn classify(status: StatusCode) -> Result<(), AssessmentServiceError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(AssessmentServiceError::Unauthorized(status))
        }
        StatusCode::NOT_FOUND => Err(AssessmentServiceError::NotFound),
        status if status.is_success() => Ok(()),
        status => Err(AssessmentServiceError::HttpStatus(status)),
    }
}

#[async_trait]
impl AssessmentService for HttpAssessmentService {
    async fn fetch_assessment(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentDefinition, AssessmentServiceError> {
        let response = self.fetch_request(id).send().await?;
        let body = Self::read_body(response).await?;
        decode_assessment(id, &body)
    }

    async fn submit_answers(
        &self,
        id: &AssessmentId,
        attempt: Uuid,
        answers: &AnswerVector,
    ) -> Result<SubmissionReceipt, AssessmentServiceError> {
        let response = self.submit_request(id, attempt, answers).send().await?;
        let body = Self::read_body(response).await?;
        decode_receipt(&body, self.clock)
    }
}

fn decode_assessment(
    id: &AssessmentId,
    body: &str,
) -> Result<AssessmentDefinition, AssessmentServiceError> {
    let dto: AssessmentDto = serde_json::from_str(body)
        .map_err(|err| AssessmentServiceError::Decode(err.to_string()))?;
    let leaked = dto.leaked_answer_keys();
    if leaked > 0 {
        warn!("assessment {id} payload carried answer keys for {leaked} question(s); discarded");
    }
    Ok(dto.into_definition(id.clone())?)
}

fn decode_receipt(body: &str, clock: Clock) -> Result<SubmissionReceipt, AssessmentServiceError> {
    let response = if body.trim().is_empty() {
        SubmitResponse::default()
    } else {
        serde_json::from_str::<SubmitResponse>(body)
            .map_err(|err| AssessmentServiceError::Decode(err.to_string()))?
    };
    Ok(SubmissionReceipt {
        submitted_at: response.submitted_at.unwrap_or_else(|| clock.now()),
        score: response.score,
        max_score: response.max_score,
    })
}
