//! Enrollment and progress tracking over HTTP.

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn progress_updates_roll_up_to_course() {
    let (app, db) = build_test_app().await;
    let instructor = create_user(&db, "Ada", Role::Instructor).await;
    let student = create_user(&db, "Sam", Role::Student).await;
    let course = create_course(&db, &instructor, CourseStatus::Approved).await;
    let mut chapters = Vec::new();
    for position in 1..=3 {
        chapters.push(create_chapter(&db, course.id, position).await);
    }
    let as_student = Some(student.id.to_string());

    let (status, _) = post(&app, &format!("/api/courses/{}/enroll", course.id), as_student.clone(), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = put(
        &app,
        "/api/progress",
        as_student.clone(),
        json!({
            "course_id": course.id,
            "chapter_id": chapters[1].id,
            "is_completed": true,
            "last_position": 310,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["course_progress"], 33.33);
    assert_eq!(json["progress"]["is_completed"], true);
    assert_eq!(json["progress"]["last_position"], 310);

    let (status, json) = get(&app, &format!("/api/progress/{}", course.id), as_student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["progress_percent"], 33.33);
    assert_eq!(json["course"]["id"], course.id.to_string());
    assert_eq!(json["progress"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn progress_requires_enrollment() {
    let (app, db) = build_test_app().await;
    let instructor = create_user(&db, "Ada", Role::Instructor).await;
    let student = create_user(&db, "Sam", Role::Student).await;
    let course = create_course(&db, &instructor, CourseStatus::Approved).await;
    let chapter = create_chapter(&db, course.id, 1).await;

    let (status, _) = put(
        &app,
        "/api/progress",
        Some(student.id.to_string()),
        json!({ "course_id": course.id, "chapter_id": chapter.id, "is_completed": true }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn chapter_from_other_course_is_rejected() {
    let (app, db) = build_test_app().await;
    let instructor = create_user(&db, "Ada", Role::Instructor).await;
    let student = create_user(&db, "Sam", Role::Student).await;
    let course = create_course(&db, &instructor, CourseStatus::Approved).await;
    let other = create_course(&db, &instructor, CourseStatus::Approved).await;
    let foreign = create_chapter(&db, other.id, 1).await;
    enroll(&db, course.id, &student).await;

    let (status, json) = put(
        &app,
        "/api/progress",
        Some(student.id.to_string()),
        json!({ "course_id": course.id, "chapter_id": foreign.id, "is_completed": true }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn second_enrollment_returns_ok_without_duplicate() {
    let (app, db) = build_test_app().await;
    let instructor = create_user(&db, "Ada", Role::Instructor).await;
    let student = create_user(&db, "Sam", Role::Student).await;
    let course = create_course(&db, &instructor, CourseStatus::Approved).await;
    let uri = format!("/api/courses/{}/enroll", course.id);
    let as_student = Some(student.id.to_string());

    let (status, _) = post(&app, &uri, as_student.clone(), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = post(&app, &uri, as_student.clone(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["student_id"], student.id.to_string());

    let (status, json) = get(&app, "/api/enrollments", as_student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn pending_course_cannot_be_joined() {
    let (app, db) = build_test_app().await;
    let instructor = create_user(&db, "Ada", Role::Instructor).await;
    let student = create_user(&db, "Sam", Role::Student).await;
    let course = create_course(&db, &instructor, CourseStatus::Pending).await;

    let (status, _) = post(
        &app,
        &format!("/api/courses/{}/enroll", course.id),
        Some(student.id.to_string()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
