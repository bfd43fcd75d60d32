use dietario_core::{Book, BookRepository, RepoError, SqliteBookRepository};

#[test]
fn create_assigns_identity_and_get_roundtrips() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();

    let mut book = Book::new("El Aleph", "Jorge Luis Borges", 1949);
    assert_eq!(book.id, None);

    let id = repo.create(&mut book).unwrap();
    assert!(id > 0);
    assert_eq!(book.id, Some(id));

    let loaded = repo.get(id).unwrap().unwrap();
    assert_eq!(loaded, book);
}

#[test]
fn get_missing_identity_is_none_not_error() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();
    assert!(repo.get(12345).unwrap().is_none());
}

#[test]
fn list_returns_insertion_order() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();

    repo.create(&mut Book::new("Rayuela", "Julio Cortázar", 1963))
        .unwrap();
    repo.create(&mut Book::new("Ficciones", "Jorge Luis Borges", 1944))
        .unwrap();
    repo.create(&mut Book::new("Pedro Páramo", "Juan Rulfo", 1955))
        .unwrap();

    let titles: Vec<String> = repo.list().unwrap().into_iter().map(|b| b.title).collect();
    assert_eq!(titles, ["Rayuela", "Ficciones", "Pedro Páramo"]);
}

#[test]
fn search_matches_substrings_in_one_column() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();

    repo.create(&mut Book::new("Ficciones", "Jorge Luis Borges", 1944))
        .unwrap();
    repo.create(&mut Book::new("El Aleph", "Jorge Luis Borges", 1949))
        .unwrap();
    repo.create(&mut Book::new("Rayuela", "Julio Cortázar", 1963))
        .unwrap();

    let by_author = repo.search_by_author("Borges").unwrap();
    assert_eq!(by_author.len(), 2);

    let by_title = repo.search_by_title("aleph").unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "El Aleph");

    assert!(repo.search_by_title("austen").unwrap().is_empty());
}

#[test]
fn update_overwrites_all_fields_and_reports_affect_count() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();

    let mut book = Book::new("Borrador", "Anónimo", 2000);
    repo.create(&mut book).unwrap();

    book.title = "Versión final".to_string();
    book.year = 2001;
    assert!(repo.update(&book).unwrap());

    let loaded = repo.get(book.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.title, "Versión final");
    assert_eq!(loaded.year, 2001);

    let mut ghost = book.clone();
    ghost.id = Some(9999);
    assert!(!repo.update(&ghost).unwrap());
}

#[test]
fn update_without_identity_is_rejected() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();

    let unsaved = Book::new("Nunca guardado", "Nadie", 1990);
    let err = repo.update(&unsaved).unwrap_err();
    assert!(matches!(err, RepoError::MissingId("book")));
}

#[test]
fn delete_reports_affect_count_and_removes_the_row() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();

    let mut book = Book::new("Efímero", "Autor", 2020);
    let id = repo.create(&mut book).unwrap();

    assert!(repo.delete(id).unwrap());
    assert!(repo.get(id).unwrap().is_none());
    assert!(!repo.delete(id).unwrap());
}

#[test]
fn close_releases_the_connection_once() {
    let repo = SqliteBookRepository::open_in_memory().unwrap();
    repo.close().unwrap();
}
