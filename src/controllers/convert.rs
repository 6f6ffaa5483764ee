use axum::{
    body::{Body, Bytes},
    extract::{multipart::Field, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    domain::conversion::{
        AudioFormat, ConversionError, ConversionJob, ConversionOptions, ConversionService,
        PageRange, Voice,
    },
    error::{AppError, AppResult},
    infrastructure::http::streaming::file_body_with_cleanup,
};

/// Content types accepted for the `pdf` part; an absent type is accepted too
const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/pdf", "application/octet-stream"];

/// The uploaded document part of a `/convert` request
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Parsed multipart body of `POST /convert`
#[derive(Debug)]
pub struct ConvertForm {
    pub file: UploadedFile,
    pub options: ConversionOptions,
}

impl ConvertForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ConversionError> {
        let mut file = None;
        let mut voice = None;
        let mut speed = None;
        let mut max_length = None;
        let mut start_page = None;
        let mut end_page = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ConversionError::UploadRead(e.body_text()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "pdf" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| ConversionError::UploadRead(e.body_text()))?;
                    file = Some(UploadedFile {
                        file_name,
                        content_type,
                        data,
                    });
                }
                "voice" => voice = text_value(field).await?,
                "speed" => speed = text_value(field).await?,
                "max_length" => max_length = text_value(field).await?,
                "start_page" => start_page = text_value(field).await?,
                "end_page" => end_page = text_value(field).await?,
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        let file = file.ok_or_else(|| {
            ConversionError::InvalidParameter("Missing file field 'pdf'".to_string())
        })?;

        let defaults = ConversionOptions::default();
        let options = ConversionOptions {
            voice: voice
                .map(|v| v.parse::<Voice>())
                .transpose()?
                .unwrap_or(defaults.voice),
            speed: parse_number(speed, "speed")?.unwrap_or(defaults.speed),
            max_chunk_length: parse_number(max_length, "max_length")?
                .unwrap_or(defaults.max_chunk_length),
            page_range: PageRange::new(
                parse_number(start_page, "start_page")?,
                parse_number(end_page, "end_page")?,
            ),
        };

        Ok(Self { file, options })
    }
}

/// Read a text field; blank values count as absent
async fn text_value(field: Field<'_>) -> Result<Option<String>, ConversionError> {
    let value = field
        .text()
        .await
        .map_err(|e| ConversionError::UploadRead(e.body_text()))?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    field: &str,
) -> Result<Option<T>, ConversionError> {
    value
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                ConversionError::InvalidParameter(format!(
                    "Field '{}' has invalid value '{}'",
                    field, raw
                ))
            })
        })
        .transpose()
}

fn check_content_type(content_type: Option<&str>) -> Result<(), ConversionError> {
    match content_type {
        None => Ok(()),
        Some(ct) => {
            let essence = ct.split(';').next().unwrap_or("").trim().to_lowercase();
            if ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
                Ok(())
            } else {
                Err(ConversionError::UnsupportedContentType(ct.to_string()))
            }
        }
    }
}

/// Quoted-string safe variant of a file name for Content-Disposition
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub struct ConvertController {
    conversion_service: Arc<ConversionService>,
    temp_root: PathBuf,
}

impl ConvertController {
    pub fn new(conversion_service: Arc<ConversionService>, temp_root: PathBuf) -> Self {
        Self {
            conversion_service,
            temp_root,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.conversion_service.engine_name()
    }

    /// POST /convert - Convert an uploaded PDF into a single MP3 narration
    pub async fn convert(
        State(controller): State<Arc<ConvertController>>,
        multipart: Multipart,
    ) -> AppResult<Response> {
        let form = ConvertForm::from_multipart(multipart).await?;
        check_content_type(form.file.content_type.as_deref())?;

        tracing::info!(
            file_name = ?form.file.file_name,
            upload_size = form.file.data.len(),
            voice = %form.options.voice,
            speed = form.options.speed,
            max_length = form.options.max_chunk_length,
            start_page = ?form.options.page_range.start,
            end_page = ?form.options.page_range.end,
            "Conversion request received"
        );

        let job = ConversionJob::create(&controller.temp_root, form.file.file_name.as_deref())
            .map_err(|e| AppError::Internal(format!("Failed to create working directory: {}", e)))?;

        if let Err(e) = job.write_input(&form.file.data).await {
            job.cleanup_now();
            return Err(ConversionError::UploadRead(e.to_string()).into());
        }

        // The job travels with the task: if the client goes away mid-conversion
        // the directory is still only removed once the task is done with it.
        let service = controller.conversion_service.clone();
        let options = form.options;
        let task = tokio::spawn(async move {
            let result = service
                .convert(job.input_path(), job.output_path(), &options)
                .await;
            (job, result)
        });

        let (job, result) = task
            .await
            .map_err(|e| AppError::Internal(format!("Failed to generate audio. {}", e)))?;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                job.cleanup_now();
                return Err(e.into());
            }
        };

        let file = match tokio::fs::File::open(&report.output_path).await {
            Ok(file) => file,
            Err(e) => {
                job.cleanup_now();
                return Err(AppError::Internal(format!(
                    "Failed to open generated audio: {}",
                    e
                )));
            }
        };

        let disposition = format!(
            "attachment; filename=\"{}\"",
            header_safe_file_name(job.download_name())
        );
        let body: Body = file_body_with_cleanup(file, job.into_cleanup());

        let mut response = (StatusCode::OK, body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(AudioFormat::Mp3.mime_type()),
        );
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
        headers.insert(
            "X-Character-Count",
            HeaderValue::from(report.characters as u64),
        );

        Ok(response)
    }
}
