pub mod table_of_contents;
