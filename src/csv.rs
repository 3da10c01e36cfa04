use crate::Error;

/// Serializes rows into a CSV with a header
/// # Error
/// Errors if a row cannot be serialized
pub fn serialize(items: impl Iterator<Item = impl serde::Serialize>) -> Result<Vec<u8>, Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for item in items {
        wtr.serialize(item)?;
    }
    wtr.into_inner()
        .map_err(|e| Error::provider(e.to_string()))
}

/// Deserializes rows of a CSV with a header. Empty cells deserialize to `None`.
pub fn deserialize<'a, D: serde::de::DeserializeOwned + 'a>(
    data: &'a [u8],
) -> impl Iterator<Item = Result<D, Error>> + 'a {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_reader(std::io::Cursor::new(data));
    rdr.into_deserialize().map(|r| r.map_err(Error::from))
}
