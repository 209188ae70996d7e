//! Database schema for the role catalog.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: u32 = 1;

/// SQL schema for the catalog database.
pub const SCHEMA: &str = r"
PRAGMA foreign_keys = ON;

-- Primary entities
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE CHECK (length(name) > 0),
    description TEXT
);

CREATE TABLE IF NOT EXISTS qualities (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE CHECK (length(name) > 0),
    description TEXT
);

CREATE TABLE IF NOT EXISTS knowledge (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE CHECK (length(name) > 0),
    description TEXT
);

CREATE TABLE IF NOT EXISTS pathways (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE CHECK (length(name) > 0),
    description TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE CHECK (length(name) > 0)
);

-- Associative relations
CREATE TABLE IF NOT EXISTS role_qualities (
    role_id INTEGER NOT NULL,
    quality_id INTEGER NOT NULL,
    PRIMARY KEY (role_id, quality_id),
    FOREIGN KEY (role_id) REFERENCES roles(id),
    FOREIGN KEY (quality_id) REFERENCES qualities(id)
);

CREATE TABLE IF NOT EXISTS role_knowledge (
    role_id INTEGER NOT NULL,
    knowledge_id INTEGER NOT NULL,
    level INTEGER DEFAULT 1,
    elective INTEGER DEFAULT 0,
    PRIMARY KEY (role_id, knowledge_id),
    FOREIGN KEY (role_id) REFERENCES roles(id),
    FOREIGN KEY (knowledge_id) REFERENCES knowledge(id)
);

CREATE TABLE IF NOT EXISTS role_pathways (
    role_id INTEGER NOT NULL,
    pathway_id INTEGER NOT NULL,
    PRIMARY KEY (role_id, pathway_id),
    FOREIGN KEY (role_id) REFERENCES roles(id),
    FOREIGN KEY (pathway_id) REFERENCES pathways(id)
);

CREATE TABLE IF NOT EXISTS pathway_knowledge (
    pathway_id INTEGER NOT NULL,
    knowledge_id INTEGER NOT NULL,
    level INTEGER NOT NULL DEFAULT 0,
    is_key INTEGER DEFAULT 0,
    is_optional INTEGER DEFAULT 0,
    PRIMARY KEY (pathway_id, knowledge_id),
    FOREIGN KEY (pathway_id) REFERENCES pathways(id),
    FOREIGN KEY (knowledge_id) REFERENCES knowledge(id)
);

CREATE TABLE IF NOT EXISTS category_knowledge (
    category_id INTEGER NOT NULL,
    knowledge_id INTEGER NOT NULL,
    PRIMARY KEY (category_id, knowledge_id),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (knowledge_id) REFERENCES knowledge(id)
);

-- Schema version table for migrations
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Reverse lookups for the detail queries
CREATE INDEX IF NOT EXISTS idx_role_qualities_quality ON role_qualities(quality_id);
CREATE INDEX IF NOT EXISTS idx_role_knowledge_knowledge ON role_knowledge(knowledge_id);
CREATE INDEX IF NOT EXISTS idx_role_pathways_pathway ON role_pathways(pathway_id);
CREATE INDEX IF NOT EXISTS idx_pathway_knowledge_knowledge ON pathway_knowledge(knowledge_id);
CREATE INDEX IF NOT EXISTS idx_category_knowledge_knowledge ON category_knowledge(knowledge_id);
";
