#[cfg(test)]
#[path = "tool_test.rs"]
mod tests;

use std::collections::BTreeMap;

use anyhow::bail;
use anyhow::Result;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::Artifact;
use super::FileUpload;
use super::ObjectUrlStore;
use super::ToolResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ToolName {
    Article,
    SocialPost,
    CompanyNames,
    Email,
    ImageGeneration,
    BackgroundRemoval,
    GifConverter,
    VideoToAudio,
    TextToSpeech,
    AudioTranscription,
    PdfCompress,
    ImageToPdf,
    YoutubeDownloader,
}

impl ToolName {
    pub fn parse(text: &str) -> Option<ToolName> {
        return ToolName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Pdf,
}

impl MediaKind {
    pub fn default_mime(&self) -> &'static str {
        match self {
            MediaKind::Image => return "image/png",
            MediaKind::Audio => return "audio/mpeg",
            MediaKind::Video => return "video/mp4",
            MediaKind::Pdf => return "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Image => return "png",
            MediaKind::Audio => return "mp3",
            MediaKind::Video => return "mp4",
            MediaKind::Pdf => return "pdf",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Choice(&'static [&'static str]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name sent over the wire.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    /// Free text the user typed, checked against the denylist.
    pub screened: bool,
}

impl FieldSpec {
    const fn text(name: &'static str, label: &'static str) -> FieldSpec {
        return FieldSpec {
            name,
            label,
            kind: FieldKind::Text,
            required: true,
            default: None,
            screened: true,
        };
    }

    const fn url(name: &'static str, label: &'static str) -> FieldSpec {
        return FieldSpec {
            name,
            label,
            kind: FieldKind::Text,
            required: true,
            default: None,
            screened: false,
        };
    }

    const fn count(name: &'static str, label: &'static str) -> FieldSpec {
        return FieldSpec {
            name,
            label,
            kind: FieldKind::Number,
            required: true,
            default: Some("1"),
            screened: false,
        };
    }

    const fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> FieldSpec {
        return FieldSpec {
            name,
            label,
            kind: FieldKind::Choice(options),
            required: true,
            default: Some(default),
            screened: false,
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Json,
    Multipart {
        file_field: &'static str,
        accept: &'static [&'static str],
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseShape {
    /// JSON array of strings at `pointer`.
    TextList { pointer: &'static str },
    /// Single JSON string at `pointer`.
    Text { pointer: &'static str },
    /// Direct URL at `pointer`, displayed without blob conversion.
    Url {
        pointer: &'static str,
        media: MediaKind,
    },
    /// Binary body. Downloads always use `filename`.
    Blob {
        media: MediaKind,
        filename: &'static str,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreditPolicy {
    /// The processing endpoint decrements the balance itself.
    Implicit,
    /// The client calls `/limits/decrease` after a successful action.
    Explicit,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: ToolName,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    pub transport: Transport,
    pub response: ResponseShape,
    pub credits: CreditPolicy,
}

const TONES: &[&str] = &[
    "informative",
    "professional",
    "casual",
    "friendly",
    "persuasive",
    "humorous",
];

const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Dutch",
    "Hindi",
    "Japanese",
    "Chinese",
    "Arabic",
];

const PLATFORMS: &[&str] = &["twitter", "linkedin", "instagram", "facebook"];
const IMAGE_STYLES: &[&str] = &["realistic", "illustration", "anime", "3d", "sketch"];
const VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];
const VIDEO_FORMATS: &[&str] = &["mp4", "mp3"];

static ARTICLE: ToolSpec = ToolSpec {
    name: ToolName::Article,
    title: "Article Generator",
    fields: &[
        FieldSpec::text("description", "What should the article be about?"),
        FieldSpec::choice("tone", "Tone", TONES, "informative"),
        FieldSpec::choice("language", "Language", LANGUAGES, "English"),
        FieldSpec::count("outputCount", "Number of outputs"),
    ],
    transport: Transport::Json,
    response: ResponseShape::TextList { pointer: "/posts" },
    credits: CreditPolicy::Implicit,
};

static SOCIAL_POST: ToolSpec = ToolSpec {
    name: ToolName::SocialPost,
    title: "Social Media Post Generator",
    fields: &[
        FieldSpec::text("topic", "Topic"),
        FieldSpec::choice("platform", "Platform", PLATFORMS, "twitter"),
        FieldSpec::choice("tone", "Tone", TONES, "casual"),
        FieldSpec::choice("language", "Language", LANGUAGES, "English"),
        FieldSpec::count("outputCount", "Number of outputs"),
    ],
    transport: Transport::Json,
    response: ResponseShape::TextList { pointer: "/posts" },
    credits: CreditPolicy::Implicit,
};

static COMPANY_NAMES: ToolSpec = ToolSpec {
    name: ToolName::CompanyNames,
    title: "Company Name Generator",
    fields: &[
        FieldSpec::text("description", "Describe your company"),
        FieldSpec::text("industry", "Industry"),
        FieldSpec::count("outputCount", "Number of names"),
    ],
    transport: Transport::Json,
    response: ResponseShape::TextList {
        pointer: "/data/data/data/companyNames",
    },
    credits: CreditPolicy::Implicit,
};

static EMAIL: ToolSpec = ToolSpec {
    name: ToolName::Email,
    title: "Email Writer",
    fields: &[
        FieldSpec::text("purpose", "Purpose of the email"),
        FieldSpec::text("recipient", "Recipient"),
        FieldSpec::choice("tone", "Tone", TONES, "professional"),
        FieldSpec::choice("language", "Language", LANGUAGES, "English"),
    ],
    transport: Transport::Json,
    response: ResponseShape::Text { pointer: "/email" },
    credits: CreditPolicy::Implicit,
};

static IMAGE_GENERATION: ToolSpec = ToolSpec {
    name: ToolName::ImageGeneration,
    title: "Image Generator",
    fields: &[
        FieldSpec::text("prompt", "Describe the image"),
        FieldSpec::choice("style", "Style", IMAGE_STYLES, "realistic"),
    ],
    transport: Transport::Json,
    response: ResponseShape::Url {
        pointer: "/imageUrl",
        media: MediaKind::Image,
    },
    credits: CreditPolicy::Implicit,
};

static BACKGROUND_REMOVAL: ToolSpec = ToolSpec {
    name: ToolName::BackgroundRemoval,
    title: "Background Remover",
    fields: &[],
    transport: Transport::Multipart {
        file_field: "image",
        accept: &["image/png", "image/jpeg", "image/webp"],
    },
    response: ResponseShape::Url {
        pointer: "/backgroundRemovedImageUrl/response/image_url",
        media: MediaKind::Image,
    },
    credits: CreditPolicy::Implicit,
};

static GIF_CONVERTER: ToolSpec = ToolSpec {
    name: ToolName::GifConverter,
    title: "Video to GIF Converter",
    fields: &[],
    transport: Transport::Multipart {
        file_field: "video",
        accept: &["video/*"],
    },
    response: ResponseShape::Blob {
        media: MediaKind::Image,
        filename: "output.gif",
    },
    credits: CreditPolicy::Implicit,
};

static VIDEO_TO_AUDIO: ToolSpec = ToolSpec {
    name: ToolName::VideoToAudio,
    title: "Video to Audio Converter",
    fields: &[],
    transport: Transport::Multipart {
        file_field: "video",
        accept: &["video/*"],
    },
    response: ResponseShape::Blob {
        media: MediaKind::Audio,
        filename: "output.mp3",
    },
    credits: CreditPolicy::Implicit,
};

static TEXT_TO_SPEECH: ToolSpec = ToolSpec {
    name: ToolName::TextToSpeech,
    title: "Text to Speech",
    fields: &[
        FieldSpec::text("text", "Text to read aloud"),
        FieldSpec::choice("voice", "Voice", VOICES, "alloy"),
        FieldSpec::choice("language", "Language", LANGUAGES, "English"),
    ],
    transport: Transport::Json,
    response: ResponseShape::Blob {
        media: MediaKind::Audio,
        filename: "speech.mp3",
    },
    credits: CreditPolicy::Implicit,
};

static AUDIO_TRANSCRIPTION: ToolSpec = ToolSpec {
    name: ToolName::AudioTranscription,
    title: "Audio Transcription",
    fields: &[],
    transport: Transport::Multipart {
        file_field: "audio",
        accept: &["audio/*"],
    },
    response: ResponseShape::Text { pointer: "/text" },
    credits: CreditPolicy::Explicit,
};

static PDF_COMPRESS: ToolSpec = ToolSpec {
    name: ToolName::PdfCompress,
    title: "PDF Compressor",
    fields: &[],
    transport: Transport::Multipart {
        file_field: "pdf",
        accept: &["application/pdf"],
    },
    response: ResponseShape::Blob {
        media: MediaKind::Pdf,
        filename: "compressed.pdf",
    },
    credits: CreditPolicy::Implicit,
};

static IMAGE_TO_PDF: ToolSpec = ToolSpec {
    name: ToolName::ImageToPdf,
    title: "Image to PDF",
    fields: &[],
    transport: Transport::Multipart {
        file_field: "image",
        accept: &["image/*"],
    },
    response: ResponseShape::Blob {
        media: MediaKind::Pdf,
        filename: "output.pdf",
    },
    credits: CreditPolicy::Implicit,
};

static YOUTUBE_DOWNLOADER: ToolSpec = ToolSpec {
    name: ToolName::YoutubeDownloader,
    title: "YouTube Downloader",
    fields: &[
        FieldSpec::url("url", "Video URL"),
        FieldSpec::choice("format", "Format", VIDEO_FORMATS, "mp4"),
    ],
    transport: Transport::Json,
    response: ResponseShape::Blob {
        media: MediaKind::Video,
        filename: "video.mp4",
    },
    credits: CreditPolicy::Implicit,
};

impl ToolSpec {
    pub fn get(name: ToolName) -> &'static ToolSpec {
        match name {
            ToolName::Article => return &ARTICLE,
            ToolName::SocialPost => return &SOCIAL_POST,
            ToolName::CompanyNames => return &COMPANY_NAMES,
            ToolName::Email => return &EMAIL,
            ToolName::ImageGeneration => return &IMAGE_GENERATION,
            ToolName::BackgroundRemoval => return &BACKGROUND_REMOVAL,
            ToolName::GifConverter => return &GIF_CONVERTER,
            ToolName::VideoToAudio => return &VIDEO_TO_AUDIO,
            ToolName::TextToSpeech => return &TEXT_TO_SPEECH,
            ToolName::AudioTranscription => return &AUDIO_TRANSCRIPTION,
            ToolName::PdfCompress => return &PDF_COMPRESS,
            ToolName::ImageToPdf => return &IMAGE_TO_PDF,
            ToolName::YoutubeDownloader => return &YOUTUBE_DOWNLOADER,
        }
    }

    pub fn all() -> Vec<&'static ToolSpec> {
        return ToolName::iter().map(ToolSpec::get).collect();
    }

    /// Processing endpoint, without the query string.
    pub fn path(&self) -> String {
        return format!("/response/{}", self.name);
    }

    pub fn endpoint(&self, api_base: &str, user_id: &str) -> String {
        return format!(
            "{}{}?clerkId={user_id}",
            api_base.trim_end_matches('/'),
            self.path()
        );
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        return self.fields.iter().find(|e| return e.name == name);
    }

    pub fn wants_blob(&self) -> bool {
        return matches!(self.response, ResponseShape::Blob { .. });
    }

    /// File name used when downloading a text result.
    pub fn text_filename(&self) -> String {
        return format!("{}.txt", self.name);
    }
}

impl ResponseShape {
    pub fn extract(&self, response: ToolResponse, store: &ObjectUrlStore) -> Result<Artifact> {
        match (self, response) {
            (ResponseShape::TextList { pointer }, ToolResponse::Json(body)) => {
                let entries = match body.pointer(pointer) {
                    Some(serde_json::Value::Array(values)) => values
                        .iter()
                        .map(|value| {
                            if let Some(text) = value.as_str() {
                                return text.to_string();
                            }
                            return value.to_string();
                        })
                        .collect::<Vec<String>>(),
                    Some(serde_json::Value::String(text)) => vec![text.to_string()],
                    _ => bail!(format!("Response is missing a list at {pointer}")),
                };

                return Ok(Artifact::Text(entries));
            }
            (ResponseShape::Text { pointer }, ToolResponse::Json(body)) => {
                if let Some(text) = body.pointer(pointer).and_then(|e| return e.as_str()) {
                    return Ok(Artifact::Text(vec![text.to_string()]));
                }
                bail!(format!("Response is missing text at {pointer}"));
            }
            (ResponseShape::Url { pointer, media }, ToolResponse::Json(body)) => {
                if let Some(url) = body.pointer(pointer).and_then(|e| return e.as_str()) {
                    return Ok(Artifact::Remote {
                        url: url.to_string(),
                        media: *media,
                    });
                }
                bail!(format!("Response is missing a URL at {pointer}"));
            }
            (ResponseShape::Blob { media, filename }, ToolResponse::Blob { bytes, content_type }) => {
                let mime = content_type.unwrap_or_else(|| return media.default_mime().to_string());
                return Ok(Artifact::Binary {
                    object_url: store.create(bytes, &mime),
                    media: *media,
                    filename: filename.to_string(),
                });
            }
            (ResponseShape::Blob { .. }, ToolResponse::Json(_)) => {
                bail!("Expected a binary response but received JSON");
            }
            (_, ToolResponse::Blob { .. }) => {
                bail!("Expected a JSON response but received binary data");
            }
        }
    }
}

/// Form values for a single invocation. Discarded once the action resolves.
#[derive(Clone, Debug, Default)]
pub struct ToolRequest {
    pub fields: BTreeMap<String, String>,
    pub file: Option<FileUpload>,
}

impl ToolRequest {
    pub fn new() -> ToolRequest {
        return ToolRequest::default();
    }

    pub fn with_field(mut self, name: &str, value: &str) -> ToolRequest {
        self.fields.insert(name.to_string(), value.to_string());
        return self;
    }

    pub fn with_file(mut self, file: FileUpload) -> ToolRequest {
        self.file = Some(file);
        return self;
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        return self.fields.get(name).map(|e| return e.as_str());
    }

    /// Parses a `key=value` CLI argument into this request.
    pub fn push_arg(&mut self, arg: &str) -> Result<()> {
        if let Some((key, value)) = arg.split_once('=') {
            if key.trim().is_empty() {
                bail!(format!("Field argument '{arg}' has an empty name"));
            }
            self.fields
                .insert(key.trim().to_string(), value.trim().to_string());
            return Ok(());
        }

        bail!(format!("Field argument '{arg}' must be in the form key=value"));
    }

    /// Fills optional fields the user left out with the tool's defaults.
    pub fn apply_defaults(&mut self, spec: &ToolSpec) {
        for field in spec.fields {
            if let Some(default) = field.default {
                let missing = self
                    .fields
                    .get(field.name)
                    .map(|e| return e.trim().is_empty())
                    .unwrap_or(true);
                if missing {
                    self.fields
                        .insert(field.name.to_string(), default.to_string());
                }
            }
        }
    }

    /// Values for the tool's own fields, in schema order. Anything else the
    /// request carries is never sent.
    pub fn schema_fields(&self, spec: &ToolSpec) -> Vec<(&'static FieldSpec, &str)> {
        return spec
            .fields
            .iter()
            .filter_map(|field| return self.field(field.name).map(|value| return (field, value)))
            .collect();
    }

    /// JSON body for the processing call. Number fields go out as numbers.
    pub fn to_json(&self, spec: &ToolSpec) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        for (field, value) in self.schema_fields(spec) {
            if field.kind == FieldKind::Number {
                if let Ok(number) = value.trim().parse::<i64>() {
                    body.insert(field.name.to_string(), serde_json::Value::from(number));
                    continue;
                }
            }
            body.insert(field.name.to_string(), serde_json::Value::from(value));
        }

        return serde_json::Value::Object(body);
    }
}
