use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

use crate::api::client::ApiClient;
use crate::api::types::{CourseEntry, Faculty, Speciality, Student, StudentRating};

/// GET a JSON payload from the API, mapping failures to readable messages
async fn get_json<T: DeserializeOwned>(
    client: &ApiClient,
    path: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let url = format!("{}{}", client.base_url, path);

    let response = client
        .http
        .get(&url)
        .query(query)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request to {} timed out", path)
            } else if e.is_connect() {
                anyhow!("Could not reach the rating API. Check your network connection.")
            } else {
                anyhow!("Network error for {}: {}", path, e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        if status.as_u16() == 404 {
            return Err(anyhow!(
                "Not found: {} (the API may have no data for this selection)",
                path
            ));
        }
        if status.is_server_error() {
            return Err(anyhow!("Rating API server error ({}) for {}", status, path));
        }
        return Err(anyhow!("Request failed ({}) for {}", status, path));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| anyhow!("Failed to parse response from {}: {}", path, e))
}

/// List all faculties
pub async fn faculties(client: &ApiClient) -> Result<Vec<Faculty>> {
    get_json(client, "/schedule/faculties", &[]).await
}

/// List specialities within a faculty
pub async fn specialities(client: &ApiClient, faculty_id: i64) -> Result<Vec<Speciality>> {
    get_json(
        client,
        "/rating/specialities",
        &[("facultyId", faculty_id.to_string())],
    )
    .await
}

/// List course years available for a (faculty, speciality) pair
pub async fn courses(
    client: &ApiClient,
    faculty_id: i64,
    speciality_id: i64,
) -> Result<Vec<CourseEntry>> {
    get_json(
        client,
        "/rating/courses",
        &[
            ("facultyId", faculty_id.to_string()),
            ("specialityId", speciality_id.to_string()),
        ],
    )
    .await
}

/// Fetch the roster for a (speciality, course) pair
pub async fn roster(client: &ApiClient, speciality_id: i64, course: u32) -> Result<Vec<Student>> {
    get_json(
        client,
        "/rating",
        &[
            ("sdef", speciality_id.to_string()),
            ("course", course.to_string()),
        ],
    )
    .await
}

/// Fetch one student's per-lesson mark detail
pub async fn student_rating(client: &ApiClient, card_number: &str) -> Result<StudentRating> {
    get_json(
        client,
        "/rating/studentRating",
        &[("studentCardNumber", card_number.to_string())],
    )
    .await
}
