use super::*;

#[test]
fn persistence_error_to_status_maps_not_found() {
    let err = PersistenceError::NotFound(Uuid::nil());
    assert_eq!(persistence_error_to_status(&err), StatusCode::NOT_FOUND);
}

#[test]
fn persistence_error_to_status_maps_unavailable_and_serialize() {
    assert_eq!(
        persistence_error_to_status(&PersistenceError::Unavailable("down".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        persistence_error_to_status(&PersistenceError::Serialize("bad".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
