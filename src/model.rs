//! Request records produced by the command parser.
//!
//! Every update is a named `with_*` method that consumes the record and returns
//! the updated one, so a command's accumulated state can be cloned once per URL
//! without later options leaking into requests that were already emitted.
use serde::Serialize;

/// How the content of a referenced file is transformed before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Conversion {
    None,
    StripNewlines,
    UrlEncode,
}

/// Where a form field's file content ends up: attached as a file, or inlined as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileSource {
    Upload,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReference {
    pub filepath: String,
    pub conversion: Conversion,
    pub source: FileSource,
}

impl FileReference {
    pub fn new(filepath: impl Into<String>, conversion: Conversion) -> Self {
        Self {
            filepath: filepath.into(),
            conversion,
            source: FileSource::Upload,
        }
    }

    pub fn inline(filepath: impl Into<String>) -> Self {
        Self {
            filepath: filepath.into(),
            conversion: Conversion::None,
            source: FileSource::Inline,
        }
    }
}

/// A body component: literal text or a file whose content is read later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Value {
    Text(String),
    File(FileReference),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn as_file(&self) -> Option<&FileReference> {
        match self {
            Value::File(file) => Some(file),
            Value::Text(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<FileReference> for Value {
    fn from(value: FileReference) -> Self {
        Value::File(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValue {
    pub key: Value,
    pub value: Option<Value>,
}

impl KeyValue {
    pub fn new(key: impl Into<Value>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// A bare parameter with no `=value` part.
    pub fn flag(key: impl Into<Value>) -> Self {
        Self::new(key, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthType {
    #[default]
    Basic,
    Digest,
    Ntlm,
    Negotiate,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Basic => "basic",
            AuthType::Digest => "digest",
            AuthType::Ntlm => "ntlm",
            AuthType::Negotiate => "negotiate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Auth {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub kind: AuthType,
}

impl Auth {
    pub fn basic(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: Some(username.into()),
            password,
            kind: AuthType::Basic,
        }
    }

    pub fn with_kind(self, kind: AuthType) -> Self {
        Self { kind, ..self }
    }

    /// Replaces both credentials, keeping the auth type.
    pub fn with_credentials(self, username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: Some(username.into()),
            password,
            ..self
        }
    }
}

/// Insertion-ordered map with case-sensitive keys; a repeated key keeps its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Fields<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Fields<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn with(mut self, key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for Fields<V> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Fields<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Fields::new(), |fields, (key, value)| fields.with(key, value))
    }
}

pub type Headers = Fields<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyType {
    None,
    FormData,
    UrlEncoded,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::None => "none",
            BodyType::FormData => "formData",
            BodyType::UrlEncoded => "urlEncoded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", content = "fields", rename_all = "camelCase")]
pub enum Body {
    #[default]
    None,
    FormData(Fields<Value>),
    UrlEncoded(Vec<KeyValue>),
}

impl Body {
    pub fn body_type(&self) -> BodyType {
        match self {
            Body::None => BodyType::None,
            Body::FormData(_) => BodyType::FormData,
            Body::UrlEncoded(_) => BodyType::UrlEncoded,
        }
    }

    pub fn form_data(&self) -> Option<&Fields<Value>> {
        match self {
            Body::FormData(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn url_encoded(&self) -> Option<&[KeyValue]> {
        match self {
            Body::UrlEncoded(pairs) => Some(pairs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub url: String,
    pub method: String,
    pub headers: Headers,
    pub body: Body,
    /// Raw data-option arguments joined with `&`, for bodies that are not form pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            headers: Headers::new(),
            body: Body::None,
            body_string: None,
            auth: None,
            timeout: None,
        }
    }
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn body_type(&self) -> BodyType {
        self.body.body_type()
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self
        }
    }

    pub fn with_method(self, method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..self
        }
    }

    /// Header names are stored as given; callers normalize them first.
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            headers: self.headers.with(name, value.into()),
            ..self
        }
    }

    /// Sets a form field, starting a form body if none exists.
    ///
    /// A url-encoded body is replaced; the parser rejects that combination
    /// before it gets here.
    pub fn with_form_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let fields = match self.body {
            Body::FormData(ref fields) => fields.clone(),
            _ => Fields::new(),
        };
        Self {
            body: Body::FormData(fields.with(name, value.into())),
            ..self
        }
    }

    /// Appends url-encoded pairs, starting a url-encoded body if none exists.
    pub fn with_url_encoded<I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = KeyValue>,
    {
        let mut current = match self.body {
            Body::UrlEncoded(ref current) => current.clone(),
            _ => Vec::new(),
        };
        current.extend(pairs);
        Self {
            body: Body::UrlEncoded(current),
            ..self
        }
    }

    pub fn with_body_string(self, body_string: Option<String>) -> Self {
        Self {
            body_string,
            ..self
        }
    }

    /// Appends one raw data argument to the body string.
    pub fn with_body_string_part(self, part: &str) -> Self {
        let body_string = match self.body_string {
            Some(ref existing) => format!("{existing}&{part}"),
            None => part.to_string(),
        };
        Self {
            body_string: Some(body_string),
            ..self
        }
    }

    pub fn with_auth(self, auth: Option<Auth>) -> Self {
        Self { auth, ..self }
    }

    /// Merges an auth update into the existing auth (or a default basic auth).
    pub fn with_auth_update<F>(self, update: F) -> Self
    where
        F: FnOnce(Auth) -> Auth,
    {
        let current = self.auth.clone().unwrap_or_default();
        Self {
            auth: Some(update(current)),
            ..self
        }
    }

    pub fn with_timeout(self, timeout: Option<f64>) -> Self {
        Self { timeout, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_keep_insertion_order_and_overwrite_in_place() {
        let fields = Fields::new()
            .with("A", 1)
            .with("B", 2)
            .with("A", 3);
        let collected: Vec<(&str, &i32)> = fields.iter().collect();
        assert_eq!(collected, vec![("A", &3), ("B", &2)]);
        assert_eq!(fields.get("A"), Some(&3));
        assert_eq!(fields.get("a"), None);
    }

    #[test]
    fn updates_leave_the_original_untouched() {
        let base = Request::new("http://a").with_header("X", "1");
        let changed = base.clone().with_header("X", "2").with_method("POST");
        assert_eq!(base.headers.get("X").map(String::as_str), Some("1"));
        assert_eq!(base.method, "GET");
        assert_eq!(changed.headers.get("X").map(String::as_str), Some("2"));
        assert_eq!(changed.method, "POST");
    }

    #[test]
    fn auth_merges_keep_the_other_half() {
        let auth = Auth::basic("foo", Some("bar".into())).with_kind(AuthType::Digest);
        assert_eq!(auth.username.as_deref(), Some("foo"));
        assert_eq!(auth.password.as_deref(), Some("bar"));
        assert_eq!(auth.kind, AuthType::Digest);

        let auth = auth.with_credentials("me", None);
        assert_eq!(auth.kind, AuthType::Digest);
        assert_eq!(auth.password, None);
    }

    #[test]
    fn auth_update_starts_from_basic() {
        let request = Request::new("http://a").with_auth_update(|auth| auth.with_kind(AuthType::Ntlm));
        let auth = request.auth.unwrap();
        assert_eq!(auth.kind, AuthType::Ntlm);
        assert_eq!(auth.username, None);
    }

    #[test]
    fn body_updates_accumulate() {
        let request = Request::new("http://a")
            .with_url_encoded([KeyValue::new("a", Some("1".into()))])
            .with_url_encoded([KeyValue::flag("b")]);
        assert_eq!(request.body_type(), BodyType::UrlEncoded);
        assert_eq!(request.body.url_encoded().map(|pairs| pairs.len()), Some(2));

        let request = Request::new("http://a")
            .with_form_field("k", "v")
            .with_form_field("f", FileReference::inline("notes.txt"));
        let form = request.body.form_data().unwrap();
        assert_eq!(form.get("k"), Some(&Value::text("v")));
        assert_eq!(
            form.get("f").and_then(Value::as_file).map(|file| file.source),
            Some(FileSource::Inline)
        );
    }

    #[test]
    fn body_string_joins_with_ampersand() {
        let request = Request::new("http://a")
            .with_body_string_part("a=1")
            .with_body_string_part("{\"b\":2}");
        assert_eq!(request.body_string.as_deref(), Some("a=1&{\"b\":2}"));
    }
}
