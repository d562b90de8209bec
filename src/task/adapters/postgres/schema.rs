//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records owned by customers and claimed by employees.
    tasks (id) {
        /// Store-assigned task identifier.
        id -> Int8,
        /// Short task title.
        #[max_length = 100]
        title -> Varchar,
        /// Free-form task description.
        description -> Text,
        /// Date the customer needs the task done by.
        due_date -> Date,
        /// Task lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Owning customer.
        customer_id -> Int8,
        /// Employee who claimed the task.
        assigned_to -> Nullable<Int8>,
        /// Completion report.
        report -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
