use chrono::NaiveDate;
use rentdesk_core::{
    CoreConfig, CustomerField, CustomerForm, CustomerId, CustomerService, FormError,
    InMemoryCustomerRepository, NewCustomer, RentalInput, StoreError, TextField, UniqueField,
    MAX_RENTALS,
};
use rust_decimal_macros::dec;

fn demo_store() -> CustomerService<InMemoryCustomerRepository> {
    CustomerService::new(
        InMemoryCustomerRepository::with_demo_data(),
        CoreConfig::instant(),
    )
}

fn filled_form(national_id: &str, login: &str) -> CustomerForm {
    let mut form = CustomerForm::new();
    form.set_field(TextField::Name, "Beatriz Lima");
    form.set_field(TextField::NationalId, national_id);
    form.set_field(TextField::SecondaryId, "MG-98.765.432");
    form.set_field(TextField::Login, login);
    form.set_field(TextField::Password, "secret");
    form.set_field(TextField::Address, "Rua Pernambuco, 55 - Savassi");
    form.set_field(TextField::Occupation, "Lawyer");
    form
}

#[tokio::test]
async fn empty_form_reports_every_required_field_and_skips_the_store() {
    let store = demo_store();
    let mut form = CustomerForm::new();

    let err = form.submit(&store).await.unwrap_err();

    let FormError::Invalid(failures) = err else {
        panic!("expected validation failure, got {err:?}");
    };
    assert_eq!(failures.len(), 6);
    assert_eq!(form.errors().len(), 6);
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn editing_a_field_clears_only_its_errors() {
    let store = demo_store();
    let mut form = CustomerForm::new();
    form.submit(&store).await.unwrap_err();
    assert!(form.field_error(CustomerField::Name).is_some());

    form.set_field(TextField::Name, "Beatriz Lima");

    assert!(form.field_error(CustomerField::Name).is_none());
    assert!(form.field_error(CustomerField::Login).is_some());
    assert_eq!(form.errors().len(), 5);
}

#[tokio::test]
async fn submit_creates_customer_without_blank_rentals() {
    let store = demo_store();
    let mut form = filled_form("55566677788", "beatriz@email.com");

    let rental = form.add_rental().unwrap();
    rental.brand = "Renault".to_string();
    rental.model = "Kwid".to_string();
    rental.plate = "QWE-1A23".to_string();
    rental.amount = dec!(180);
    form.add_rental().unwrap();

    let created = form.submit(&store).await.unwrap();

    assert_eq!(created.id, CustomerId(3));
    assert_eq!(created.national_id, "555.666.777-88");
    assert_eq!(created.rentals.len(), 1);
    assert_eq!(created.rentals[0].plate, "QWE-1A23");
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn duplicate_national_id_surfaces_as_store_error() {
    let store = demo_store();
    let mut form = filled_form("123.456.789-00", "beatriz@email.com");

    let err = form.submit(&store).await.unwrap_err();

    assert_eq!(
        err,
        FormError::Store(StoreError::DuplicateField(UniqueField::NationalId))
    );
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn edit_form_updates_the_existing_customer() {
    let store = demo_store();
    let existing = store.get_by_id(CustomerId(2)).await.unwrap();
    let mut form = CustomerForm::edit(&existing);
    assert_eq!(form.editing(), Some(CustomerId(2)));
    assert_eq!(form.rentals().len(), 1);

    form.set_field(TextField::Occupation, "Surgeon");
    form.remove_rental(0).unwrap();
    let updated = form.submit(&store).await.unwrap();

    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.occupation, "Surgeon");
    assert!(updated.rentals.is_empty());
    assert_eq!(store.get_by_id(CustomerId(2)).await.unwrap(), updated);
}

#[tokio::test]
async fn form_never_exceeds_the_rental_cap() {
    let store = demo_store();
    let mut form = filled_form("55566677788", "beatriz@email.com");

    for index in 0..MAX_RENTALS + 2 {
        match form.add_rental() {
            Ok(rental) => {
                rental.brand = "Fiat".to_string();
                rental.model = "Argo".to_string();
                rental.plate = format!("RTY-000{index}");
            }
            Err(err) => assert_eq!(err, FormError::RentalLimitReached),
        }
    }

    let created = form.submit(&store).await.unwrap();
    assert_eq!(created.rentals.len(), MAX_RENTALS);
}

#[tokio::test]
async fn edit_form_over_the_cap_submits_only_after_rows_are_removed() {
    let store = demo_store();
    let rental = RentalInput {
        id: None,
        brand: "Jeep".to_string(),
        model: "Renegade".to_string(),
        plate: "JPR-2024".to_string(),
        start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
        amount: dec!(310),
    };
    let existing = store
        .create(NewCustomer {
            login: "frequent@email.com".to_string(),
            password: "secret".to_string(),
            name: "Paulo Frequente".to_string(),
            national_id: "444.555.666-77".to_string(),
            secondary_id: "MG-11.222.333".to_string(),
            address: "Rua Espirito Santo, 900 - Centro".to_string(),
            occupation: "Sales Rep".to_string(),
            rentals: vec![rental; MAX_RENTALS + 2],
        })
        .await
        .unwrap();

    let mut form = CustomerForm::edit(&existing);
    assert_eq!(form.rentals().len(), MAX_RENTALS + 2);
    assert_eq!(form.add_rental().unwrap_err(), FormError::RentalLimitReached);

    let err = form.submit(&store).await.unwrap_err();
    assert!(matches!(err, FormError::Invalid(_)));
    assert!(form.field_error(CustomerField::Rentals).is_some());

    form.remove_rental(0).unwrap();
    form.remove_rental(0).unwrap();
    let updated = form.submit(&store).await.unwrap();
    assert_eq!(updated.rentals.len(), MAX_RENTALS);
}
