use indoc::indoc;

/// The canonical three-table permissions layout
pub const PERMISSIONS_SCHEMA: &str = indoc! {r#"
    CREATE TABLE roles (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE users (
        id SERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE
    );

    CREATE TABLE user_roles (
        user_id INTEGER NOT NULL REFERENCES users(id),
        role_id INTEGER NOT NULL REFERENCES roles(id),
        PRIMARY KEY (user_id, role_id)
    );
"#};

/// Grants keyed on a composite (user_id, role_id) reference
pub const GRANTS_SCHEMA: &str = indoc! {r#"
    CREATE TABLE resources (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL
    );

    CREATE TABLE grants (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL,
        role_id INTEGER NOT NULL,
        resource_id INTEGER NOT NULL REFERENCES resources(id),
        CONSTRAINT grants_membership_fkey
            FOREIGN KEY (user_id, role_id) REFERENCES user_roles(user_id, role_id)
    );
"#};

/// A self-referencing folder tree
pub const FOLDER_TREE: &str = indoc! {r#"
    CREATE TABLE folders (
        id SERIAL PRIMARY KEY,
        parent_id INTEGER REFERENCES folders(id)
    );
"#};

/// A table in another schema referencing into public, and a view
pub const OUTSIDE_OBJECTS: &str = indoc! {r#"
    CREATE SCHEMA audit;

    CREATE TABLE audit.role_changes (
        id SERIAL PRIMARY KEY,
        role_id INTEGER NOT NULL REFERENCES public.roles(id)
    );

    CREATE VIEW user_emails AS SELECT id, email FROM users;
"#};

/// Two tables referencing each other
pub const CYCLIC_SCHEMA: &str = indoc! {r#"
    CREATE TABLE teams (
        id SERIAL PRIMARY KEY,
        owner_id INTEGER
    );

    CREATE TABLE members (
        id SERIAL PRIMARY KEY,
        team_id INTEGER NOT NULL REFERENCES teams(id)
    );

    ALTER TABLE teams
        ADD CONSTRAINT teams_owner_fkey FOREIGN KEY (owner_id) REFERENCES members(id);
"#};
